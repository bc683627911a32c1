//! Session Management Use Case
//!
//! Listing and revoking a user's active sessions.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::auth_session::SessionInfo;
use crate::domain::repository::AuthSessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Sessions use case
pub struct SessionsUseCase<S>
where
    S: AuthSessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SessionsUseCase<S>
where
    S: AuthSessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// List active sessions for a user, marking the current one
    pub async fn list(
        &self,
        user_id: &UserId,
        current_session_id: Uuid,
    ) -> AuthResult<Vec<SessionInfo>> {
        let sessions = self.session_repo.find_by_user_id(user_id).await?;

        Ok(sessions
            .iter()
            .map(|s| {
                let mut info = SessionInfo::from(s);
                info.is_current = s.session_id == current_session_id;
                info
            })
            .collect())
    }

    /// Revoke one of the user's sessions by ID
    ///
    /// Ownership is checked so a session ID from another user 404s.
    pub async fn revoke(&self, user_id: &UserId, session_id: Uuid) -> AuthResult<()> {
        let sessions = self.session_repo.find_by_user_id(user_id).await?;

        if !sessions.iter().any(|s| s.session_id == session_id) {
            return Err(AuthError::UserNotFound);
        }

        self.session_repo.delete(session_id).await?;

        tracing::info!(
            user_id = %user_id,
            session_id = %session_id,
            "Session revoked"
        );

        Ok(())
    }
}
