//! Login History Use Case
//!
//! Read side of the login history. Writes happen inside sign-in.

use std::sync::Arc;

use crate::domain::entity::login_history::LoginAttempt;
use crate::domain::repository::LoginHistoryRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Default number of attempts returned
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Maximum number of attempts a client may request
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Login history use case
pub struct LoginHistoryUseCase<H>
where
    H: LoginHistoryRepository,
{
    history_repo: Arc<H>,
}

impl<H> LoginHistoryUseCase<H>
where
    H: LoginHistoryRepository,
{
    pub fn new(history_repo: Arc<H>) -> Self {
        Self { history_repo }
    }

    /// List recent attempts for a user, newest first
    pub async fn list(&self, user_id: &UserId, limit: Option<u32>) -> AuthResult<Vec<LoginAttempt>> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .min(MAX_HISTORY_LIMIT);
        self.history_repo.list_recent(user_id, limit).await
    }
}
