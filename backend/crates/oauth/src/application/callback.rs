//! Callback Use Case
//!
//! Completes an external sign-in: validates the round-tripped state,
//! exchanges the code, fetches the provider identity and binds it to a
//! local account - linking, matching by verified email, or creating a
//! fresh user. Ends in a normal server-side session, with the same 2FA
//! gate password sign-in has.

use std::sync::Arc;

use auth::application::config::AuthConfig;
use auth::application::session_token::sign_session_token;
use auth::domain::entity::auth::Auth;
use auth::domain::entity::auth_session::AuthSession;
use auth::domain::entity::user::User;
use auth::domain::entity::user_details::UserDetails;
use auth::domain::repository::{
    AuthRepository, AuthSessionRepository, UserDetailsRepository, UserRepository,
};
use auth::models::email::Email;
use auth::models::user_name::UserName;
use auth::models::user_password::{RawPassword, UserPassword};
use auth::presentation::AuthRepositories;
use platform::client::ClientFingerprint;
use platform::crypto::{hash_token, random_token};

use crate::application::config::OAuthConfig;
use crate::application::provider_client::{self, ProviderUserInfo};
use crate::domain::entities::OAuthIdentity;
use crate::domain::repository::{IdentityRepository, LoginStateRepository, OAuthRepositories};
use crate::domain::value_objects::Provider;
use crate::error::{OAuthError, OAuthResult};

/// Callback input
pub struct CallbackInput {
    pub provider: Provider,
    pub state: String,
    pub code: String,
}

/// Callback output
pub struct CallbackOutput {
    /// Session token for the cookie (empty when no session was created)
    pub session_token: String,
    /// The account has TOTP enabled; finish sign-in with credentials + code
    pub requires_2fa: bool,
    /// True when this flow linked an identity to an existing session
    pub linked: bool,
    pub public_id: String,
    /// Where the UI asked to land after the flow
    pub redirect_to: Option<String>,
}

/// Callback use case
pub struct CallbackUseCase<O, R>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    oauth_repo: Arc<O>,
    auth_repo: Arc<R>,
    oauth_config: Arc<OAuthConfig>,
    auth_config: Arc<AuthConfig>,
}

impl<O, R> CallbackUseCase<O, R>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    pub fn new(
        oauth_repo: Arc<O>,
        auth_repo: Arc<R>,
        oauth_config: Arc<OAuthConfig>,
        auth_config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            oauth_repo,
            auth_repo,
            oauth_config,
            auth_config,
        }
    }

    pub async fn execute(
        &self,
        input: CallbackInput,
        fingerprint: ClientFingerprint,
    ) -> OAuthResult<CallbackOutput> {
        // Single-use state: consumed here, gone for any replay
        let flow = self
            .oauth_repo
            .consume_by_hash(&hash_token(&input.state))
            .await?
            .ok_or(OAuthError::StateInvalid)?;

        if flow.is_expired() || flow.provider != input.provider {
            return Err(OAuthError::StateInvalid);
        }

        let provider_config = self
            .oauth_config
            .provider(input.provider)
            .ok_or_else(|| OAuthError::ProviderNotFound(input.provider.slug().to_string()))?;

        let redirect_uri = self.oauth_config.callback_uri(input.provider);

        let provider_token = provider_client::exchange_code(
            provider_config,
            &input.code,
            &flow.pkce_verifier,
            &redirect_uri,
        )
        .await?;

        let info = provider_client::fetch_user_info(provider_config, &provider_token).await?;

        // Linking flow: bind the identity to the already signed-in user
        if let Some(link_user_id) = flow.link_user_id {
            let user = UserRepository::find_by_id(self.auth_repo.as_ref(), &link_user_id)
                .await?
                .ok_or(OAuthError::SessionRequired)?;

            self.bind_identity(input.provider, &info, &user).await?;

            tracing::info!(
                public_id = %user.public_id,
                provider = %input.provider,
                "External identity linked"
            );

            return Ok(CallbackOutput {
                session_token: String::new(),
                requires_2fa: false,
                linked: true,
                public_id: user.public_id.to_string(),
                redirect_to: flow.redirect_to,
            });
        }

        // Sign-in flow: resolve the identity to a local user
        let user = self.resolve_user(input.provider, &info).await?;

        if !user.can_login() {
            return Err(OAuthError::Auth(auth::AuthError::AccountDisabled));
        }

        // The provider proves the email, not the second factor
        let credentials = AuthRepository::find_by_user_id(self.auth_repo.as_ref(), &user.user_id)
            .await?
            .ok_or_else(|| OAuthError::Internal("Auth not found".to_string()))?;

        if user.requires_2fa() || credentials.requires_2fa() {
            return Ok(CallbackOutput {
                session_token: String::new(),
                requires_2fa: true,
                linked: false,
                public_id: user.public_id.to_string(),
                redirect_to: flow.redirect_to,
            });
        }

        let mut user = user;
        user.record_login();
        UserRepository::update(self.auth_repo.as_ref(), &user).await?;

        let ttl = chrono::Duration::from_std(self.auth_config.session_ttl_short)
            .map_err(|e| OAuthError::Internal(format!("Invalid session TTL: {e}")))?;

        let session = AuthSession::new(
            user.user_id.clone(),
            user.public_id,
            user.user_role,
            false,
            fingerprint.hash_vec(),
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
            ttl,
        );
        AuthSessionRepository::create(self.auth_repo.as_ref(), &session).await?;

        let session_token =
            sign_session_token(&self.auth_config.session_secret, session.session_id);

        tracing::info!(
            public_id = %user.public_id,
            provider = %input.provider,
            session_id = %session.session_id,
            "User signed in via external provider"
        );

        Ok(CallbackOutput {
            session_token,
            requires_2fa: false,
            linked: false,
            public_id: user.public_id.to_string(),
            redirect_to: flow.redirect_to,
        })
    }

    /// Bind the provider identity to `user`, rejecting identities that
    /// already belong to someone else
    async fn bind_identity(
        &self,
        provider: Provider,
        info: &ProviderUserInfo,
        user: &User,
    ) -> OAuthResult<()> {
        match self
            .oauth_repo
            .find_by_subject(provider, &info.subject)
            .await?
        {
            Some(mut existing) => {
                if existing.user_id != user.user_id {
                    return Err(OAuthError::IdentityConflict);
                }
                existing.update_profile(info.email.clone(), info.display_name.clone());
                IdentityRepository::update(self.oauth_repo.as_ref(), &existing).await?;
            }
            None => {
                let identity = OAuthIdentity::new(
                    user.user_id.clone(),
                    provider,
                    &info.subject,
                    info.email.clone(),
                    info.display_name.clone(),
                );
                IdentityRepository::create(self.oauth_repo.as_ref(), &identity).await?;
            }
        }

        Ok(())
    }

    /// Find the local user behind a provider identity, creating one
    /// when nothing matches
    async fn resolve_user(
        &self,
        provider: Provider,
        info: &ProviderUserInfo,
    ) -> OAuthResult<User> {
        // Previously linked identity wins
        if let Some(identity) = self
            .oauth_repo
            .find_by_subject(provider, &info.subject)
            .await?
        {
            let user = UserRepository::find_by_id(self.auth_repo.as_ref(), &identity.user_id)
                .await?
                .ok_or_else(|| OAuthError::Internal("Identity without user".to_string()))?;
            return Ok(user);
        }

        // Match an existing account only on a provider-verified email
        if info.email_verified {
            if let Some(raw_email) = &info.email {
                if let Ok(email) = Email::new(raw_email.as_str()) {
                    if let Some(user) =
                        UserRepository::find_by_email(self.auth_repo.as_ref(), &email).await?
                    {
                        self.bind_identity(provider, info, &user).await?;
                        return Ok(user);
                    }
                }
            }
        }

        // Otherwise provision a fresh account
        let user = self.create_user(info).await?;
        self.bind_identity(provider, info, &user).await?;
        Ok(user)
    }

    /// Create a local account for a first-time provider sign-in
    async fn create_user(&self, info: &ProviderUserInfo) -> OAuthResult<User> {
        let user_name = self.pick_user_name(info).await?;

        let user = User::new(user_name);

        let mut details = UserDetails::new(user.user_id.clone());
        if let Some(raw_email) = &info.email {
            if let Ok(email) = Email::new(raw_email.as_str()) {
                if info.email_verified {
                    details.set_verified_email(email);
                } else {
                    details.set_email(email);
                }
            }
        }
        details.set_display_name(info.display_name.clone());

        // Password sign-in stays possible after a reset; until then the
        // account carries an unguessable placeholder
        let placeholder = RawPassword::new(random_token(24))
            .map_err(|e| OAuthError::Internal(e.to_string()))?;
        let password_hash = UserPassword::from_raw(&placeholder, self.auth_config.pepper())
            .map_err(|e| OAuthError::Internal(e.to_string()))?;
        let credentials = Auth::new(user.user_id.clone(), password_hash);

        UserRepository::create(self.auth_repo.as_ref(), &user).await?;
        UserDetailsRepository::create(self.auth_repo.as_ref(), &details).await?;
        AuthRepository::create(self.auth_repo.as_ref(), &credentials).await?;

        tracing::info!(
            public_id = %user.public_id,
            user_name = %user.user_name,
            "User provisioned from external identity"
        );

        Ok(user)
    }

    /// Derive a free local user name from the provider profile
    async fn pick_user_name(&self, info: &ProviderUserInfo) -> OAuthResult<UserName> {
        let base = info
            .login
            .clone()
            .or_else(|| info.display_name.clone())
            .or_else(|| {
                info.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "user".to_string());

        let base = sanitize_user_name(&base);

        for attempt in 0..5 {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                let suffix: String = random_token(4).chars().take(4).collect();
                format!("{}-{}", truncate_chars(&base, 25), suffix)
            };

            let Ok(user_name) = UserName::new(candidate) else {
                continue;
            };

            if !UserRepository::exists_by_user_name(self.auth_repo.as_ref(), &user_name).await? {
                return Ok(user_name);
            }
        }

        Err(OAuthError::Internal(
            "Could not derive a free user name".to_string(),
        ))
    }
}

/// Reduce arbitrary provider handles to the local user name alphabet
fn sanitize_user_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '+'))
        .collect();

    let cleaned = truncate_chars(cleaned.trim_matches(|c: char| !c.is_ascii_alphanumeric()), 30);

    if cleaned.chars().count() < 3 {
        "user".to_string()
    } else {
        cleaned
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_user_name() {
        assert_eq!(sanitize_user_name("octocat"), "octocat");
        assert_eq!(sanitize_user_name("Octo Cat!"), "OctoCat");
        assert_eq!(sanitize_user_name("--x--"), "user");
        assert_eq!(sanitize_user_name("日本"), "user");
        assert_eq!(sanitize_user_name(&"a".repeat(64)).chars().count(), 30);
    }
}
