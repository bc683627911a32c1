//! Userinfo Use Case
//!
//! Resolves a bearer access token issued by the authorization server
//! to the public profile of the granting user.

use std::sync::Arc;

use auth::domain::repository::{UserDetailsRepository, UserRepository};
use auth::presentation::AuthRepositories;
use platform::crypto::hash_token;

use crate::domain::repository::AccessTokenRepository;
use crate::error::{OAuthError, OAuthResult};

/// Userinfo output
pub struct UserinfoOutput {
    /// Stable subject: the user's public ID
    pub sub: String,
    pub user_name: String,
    pub display_name: Option<String>,
    /// Present only when the grant includes the `email` scope
    pub email: Option<String>,
}

/// Userinfo use case
pub struct UserinfoUseCase<O, R>
where
    O: AccessTokenRepository,
    R: AuthRepositories,
{
    oauth_repo: Arc<O>,
    auth_repo: Arc<R>,
}

impl<O, R> UserinfoUseCase<O, R>
where
    O: AccessTokenRepository,
    R: AuthRepositories,
{
    pub fn new(oauth_repo: Arc<O>, auth_repo: Arc<R>) -> Self {
        Self {
            oauth_repo,
            auth_repo,
        }
    }

    pub async fn execute(&self, bearer_token: &str) -> OAuthResult<UserinfoOutput> {
        let token = self
            .oauth_repo
            .find_by_hash(&hash_token(bearer_token))
            .await?
            .ok_or(OAuthError::TokenInvalid)?;

        if !token.is_valid() {
            return Err(OAuthError::TokenInvalid);
        }

        let user = UserRepository::find_by_id(self.auth_repo.as_ref(), &token.user_id)
            .await?
            .ok_or(OAuthError::TokenInvalid)?;

        let details =
            UserDetailsRepository::find_by_user_id(self.auth_repo.as_ref(), &token.user_id)
                .await?;

        let email = if token.scope.contains("email") {
            details
                .as_ref()
                .and_then(|d| d.email.as_ref())
                .map(|e| e.as_str().to_string())
        } else {
            None
        };

        Ok(UserinfoOutput {
            sub: user.public_id.to_string(),
            user_name: user.user_name.as_str().to_string(),
            display_name: details.and_then(|d| d.display_name),
            email,
        })
    }
}
