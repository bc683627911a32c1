//! Token Endpoint Use Cases
//!
//! Authorization-code exchange and RFC 7009 revocation for the OAuth2
//! server role. Access tokens are opaque and stored hashed.

use std::sync::Arc;

use platform::crypto::{hash_token, random_token};

use crate::application::config::OAuthConfig;
use crate::domain::entities::AccessToken;
use crate::domain::repository::{
    AccessTokenRepository, AuthorizationCodeRepository, OAuthAppRepository,
};
use crate::error::{OAuthError, OAuthResult};

/// Byte length of the opaque access token material
const ACCESS_TOKEN_BYTES: usize = 32;

/// Token request input, from the form body
pub struct TokenRequestInput {
    pub grant_type: String,
    pub code: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub code_verifier: String,
}

/// Token response data
pub struct TokenOutput {
    pub access_token: String,
    pub expires_in: i64,
    pub scope: String,
}

/// Token exchange use case
pub struct TokenExchangeUseCase<O>
where
    O: OAuthAppRepository + AuthorizationCodeRepository + AccessTokenRepository,
{
    repo: Arc<O>,
    config: Arc<OAuthConfig>,
}

impl<O> TokenExchangeUseCase<O>
where
    O: OAuthAppRepository + AuthorizationCodeRepository + AccessTokenRepository,
{
    pub fn new(repo: Arc<O>, config: Arc<OAuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: TokenRequestInput) -> OAuthResult<TokenOutput> {
        if input.grant_type != "authorization_code" {
            return Err(OAuthError::UnsupportedGrantType(input.grant_type));
        }

        let app = OAuthAppRepository::find_by_client_id(self.repo.as_ref(), &input.client_id)
            .await?
            .ok_or(OAuthError::AppNotFound)?;

        // Confidential clients must present their secret
        if app.is_confidential() {
            let secret = input
                .client_secret
                .as_deref()
                .ok_or(OAuthError::ClientAuthFailed)?;
            if !app.verify_secret(&hash_token(secret)) {
                return Err(OAuthError::ClientAuthFailed);
            }
        }

        let code = AuthorizationCodeRepository::find_by_hash(
            self.repo.as_ref(),
            &hash_token(&input.code),
        )
        .await?
        .ok_or(OAuthError::CodeInvalid)?;

        if code.app_id != app.app_id {
            return Err(OAuthError::CodeInvalid);
        }
        if code.is_used() || code.is_expired() {
            return Err(OAuthError::CodeInvalid);
        }
        if code.redirect_uri != input.redirect_uri {
            return Err(OAuthError::RedirectUriMismatch);
        }
        if !code.code_challenge.verify(&input.code_verifier) {
            return Err(OAuthError::PkceMismatch);
        }

        // Single-use: the mark is atomic, a concurrent exchange loses
        AuthorizationCodeRepository::mark_used(self.repo.as_ref(), &code).await?;

        let ttl = chrono::Duration::from_std(self.config.access_token_ttl)
            .map_err(|e| OAuthError::Internal(format!("Invalid token TTL: {e}")))?;

        let opaque = random_token(ACCESS_TOKEN_BYTES);
        let token = AccessToken::new(
            code.app_id,
            code.user_id.clone(),
            hash_token(&opaque).to_vec(),
            code.scope.clone(),
            ttl,
        );
        AccessTokenRepository::create(self.repo.as_ref(), &token).await?;

        tracing::info!(
            client_id = %app.client_id,
            user_id = %code.user_id,
            scope = %token.scope,
            "Access token issued"
        );

        Ok(TokenOutput {
            access_token: opaque,
            expires_in: self.config.access_token_ttl.as_secs() as i64,
            scope: token.scope.as_str(),
        })
    }
}

/// Token revocation use case (RFC 7009)
pub struct TokenRevokeUseCase<O>
where
    O: AccessTokenRepository,
{
    repo: Arc<O>,
}

impl<O> TokenRevokeUseCase<O>
where
    O: AccessTokenRepository,
{
    pub fn new(repo: Arc<O>) -> Self {
        Self { repo }
    }

    /// Revoke the presented token. Unknown tokens are a no-op; the
    /// endpoint answers 200 either way.
    pub async fn execute(&self, token: &str) -> OAuthResult<()> {
        let revoked = self
            .repo
            .revoke_by_hash(&hash_token(token))
            .await?;

        if revoked > 0 {
            tracing::info!("OAuth access token revoked");
        }

        Ok(())
    }
}
