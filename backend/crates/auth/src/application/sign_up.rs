//! Sign Up Use Case
//!
//! Creates a new user account with optional contact email.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth::Auth, user::User, user_details::UserDetails};
use crate::domain::repository::{AuthRepository, UserDetailsRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub user_name: String,
    pub email: Option<String>,
    pub password: String,
}

/// Sign up output
pub struct SignUpOutput {
    pub public_id: String,
}

/// Sign up use case
pub struct SignUpUseCase<U, D, A>
where
    U: UserRepository,
    D: UserDetailsRepository,
    A: AuthRepository,
{
    user_repo: Arc<U>,
    details_repo: Arc<D>,
    auth_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<U, D, A> SignUpUseCase<U, D, A>
where
    U: UserRepository,
    D: UserDetailsRepository,
    A: AuthRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        details_repo: Arc<D>,
        auth_repo: Arc<A>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            details_repo,
            auth_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        // Validate user name
        let user_name = UserName::new(input.user_name)
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        // Check if user name is taken
        if self.user_repo.exists_by_user_name(&user_name).await? {
            return Err(AuthError::UserNameTaken);
        }

        // Validate email when provided
        let email = match input.email {
            Some(raw) => {
                let email =
                    Email::new(raw).map_err(|e| AuthError::Validation(e.to_string()))?;
                if self.details_repo.exists_by_email(email.as_str()).await? {
                    return Err(AuthError::EmailTaken);
                }
                Some(email)
            }
            None => None,
        };

        // Validate and hash password
        let raw_password = RawPassword::new(input.password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;

        // HIBP breach check; an unreachable API never blocks signup
        match raw_password.is_compromised().await {
            Ok(true) => {
                return Err(AuthError::PasswordValidation(
                    "This password has been found in a data breach".to_string(),
                ));
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Password breach check unavailable");
            }
        }

        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        // Create user, details and auth credentials
        let user = User::new(user_name);

        let mut details = UserDetails::new(user.user_id.clone());
        if let Some(email) = email {
            details.set_email(email);
        }

        let auth = Auth::new(user.user_id.clone(), password_hash);

        self.user_repo.create(&user).await?;
        self.details_repo.create(&details).await?;
        self.auth_repo.create(&auth).await?;

        tracing::info!(
            public_id = %user.public_id,
            user_name = %user.user_name,
            "User signed up"
        );

        Ok(SignUpOutput {
            public_id: user.public_id.to_string(),
        })
    }
}
