//! Authorize Use Case
//!
//! The authorization endpoint of the OAuth2 server role: a signed-in
//! user grants a registered app access, and the app's redirect URI
//! receives a single-use authorization code.

use std::sync::Arc;

use auth::models::user_id::UserId;
use platform::crypto::{hash_token, random_token};
use url::Url;

use crate::application::config::OAuthConfig;
use crate::domain::entities::AuthorizationCode;
use crate::domain::repository::{AuthorizationCodeRepository, OAuthAppRepository};
use crate::domain::value_objects::{PkceChallenge, ScopeSet};
use crate::error::{OAuthError, OAuthResult};

/// Byte length of the opaque authorization code material
const AUTH_CODE_BYTES: usize = 32;

/// Authorize input, straight from the query string
pub struct AuthorizeInput {
    pub response_type: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
}

/// Authorize output
pub struct AuthorizeOutput {
    /// Full redirect URL carrying `code` (and `state` when provided)
    pub redirect_url: String,
}

/// Authorize use case
pub struct AuthorizeUseCase<O>
where
    O: OAuthAppRepository + AuthorizationCodeRepository,
{
    repo: Arc<O>,
    config: Arc<OAuthConfig>,
}

impl<O> AuthorizeUseCase<O>
where
    O: OAuthAppRepository + AuthorizationCodeRepository,
{
    pub fn new(repo: Arc<O>, config: Arc<OAuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        input: AuthorizeInput,
        user_id: &UserId,
    ) -> OAuthResult<AuthorizeOutput> {
        if input.response_type != "code" {
            return Err(OAuthError::UnsupportedGrantType(input.response_type));
        }

        let app = OAuthAppRepository::find_by_client_id(self.repo.as_ref(), &input.client_id)
            .await?
            .ok_or(OAuthError::AppNotFound)?;

        // Exact match only - no prefix or wildcard redirect URIs
        if !app.redirect_uri_allowed(&input.redirect_uri) {
            return Err(OAuthError::RedirectUriMismatch);
        }

        let scope = match input.scope.as_deref() {
            Some(raw) => ScopeSet::parse(raw),
            None => app.allowed_scopes.clone(),
        };
        if !scope.is_subset_of(&app.allowed_scopes) {
            return Err(OAuthError::InvalidScope);
        }

        // PKCE S256 is mandatory for every client
        if input.code_challenge_method.as_deref() != Some("S256") {
            return Err(OAuthError::PkceRequired);
        }
        let code_challenge = input
            .code_challenge
            .as_deref()
            .and_then(PkceChallenge::new)
            .ok_or(OAuthError::PkceRequired)?;

        let ttl = chrono::Duration::from_std(self.config.auth_code_ttl)
            .map_err(|e| OAuthError::Internal(format!("Invalid code TTL: {e}")))?;

        let opaque = random_token(AUTH_CODE_BYTES);
        let code = AuthorizationCode::new(
            app.app_id,
            user_id.clone(),
            hash_token(&opaque).to_vec(),
            &input.redirect_uri,
            scope,
            code_challenge,
            ttl,
        );
        AuthorizationCodeRepository::create(self.repo.as_ref(), &code).await?;

        let mut url = Url::parse(&input.redirect_uri)
            .map_err(|_| OAuthError::RedirectUriMismatch)?;
        url.query_pairs_mut().append_pair("code", &opaque);
        if let Some(state) = &input.state {
            url.query_pairs_mut().append_pair("state", state);
        }

        tracing::info!(
            client_id = %app.client_id,
            user_id = %user_id,
            scope = %code.scope,
            "Authorization code issued"
        );

        Ok(AuthorizeOutput {
            redirect_url: url.to_string(),
        })
    }
}
