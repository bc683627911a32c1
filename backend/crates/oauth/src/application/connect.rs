//! Connect Use Case
//!
//! Starts an external sign-in (or identity-link) flow: generates the
//! CSRF state and PKCE pair, persists them server-side and builds the
//! provider authorization URL.

use std::sync::Arc;

use auth::models::user_id::UserId;
use platform::crypto::{hash_token, random_token};
use url::Url;

use crate::application::config::OAuthConfig;
use crate::domain::entities::LoginFlowState;
use crate::domain::repository::LoginStateRepository;
use crate::domain::value_objects::{PkceChallenge, Provider};
use crate::error::{OAuthError, OAuthResult};

/// Byte length of state and PKCE verifier material
const FLOW_TOKEN_BYTES: usize = 32;

/// Connect output
pub struct ConnectOutput {
    /// Provider authorization URL to redirect the browser to
    pub authorize_url: String,
}

/// Connect use case
pub struct ConnectUseCase<S>
where
    S: LoginStateRepository,
{
    state_repo: Arc<S>,
    config: Arc<OAuthConfig>,
}

impl<S> ConnectUseCase<S>
where
    S: LoginStateRepository,
{
    pub fn new(state_repo: Arc<S>, config: Arc<OAuthConfig>) -> Self {
        Self { state_repo, config }
    }

    /// Begin a flow. `link_user_id` is set when a signed-in user is
    /// linking the provider to their existing account.
    pub async fn execute(
        &self,
        provider: Provider,
        link_user_id: Option<UserId>,
        redirect_to: Option<String>,
    ) -> OAuthResult<ConnectOutput> {
        let provider_config = self
            .config
            .provider(provider)
            .ok_or_else(|| OAuthError::ProviderNotFound(provider.slug().to_string()))?;

        let state = random_token(FLOW_TOKEN_BYTES);
        let pkce_verifier = random_token(FLOW_TOKEN_BYTES);
        let pkce_challenge = PkceChallenge::from_verifier(&pkce_verifier);

        let ttl = chrono::Duration::from_std(self.config.login_state_ttl)
            .map_err(|e| OAuthError::Internal(format!("Invalid state TTL: {e}")))?;

        let flow_state = LoginFlowState::new(
            hash_token(&state).to_vec(),
            provider,
            pkce_verifier,
            link_user_id,
            redirect_to,
            ttl,
        );
        self.state_repo.create(&flow_state).await?;

        let redirect_uri = self.config.callback_uri(provider);

        let mut url = Url::parse(&provider_config.authorize_url)
            .map_err(|e| OAuthError::Internal(format!("Invalid authorize URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &provider_config.client_id)
            .append_pair("redirect_uri", &redirect_uri)
            .append_pair("state", &state)
            .append_pair("scope", &provider_config.scopes)
            .append_pair("response_type", "code")
            .append_pair("code_challenge", pkce_challenge.as_str())
            .append_pair("code_challenge_method", "S256");

        tracing::info!(
            provider = %provider,
            linking = flow_state.link_user_id.is_some(),
            "External sign-in flow started"
        );

        Ok(ConnectOutput {
            authorize_url: url.to_string(),
        })
    }
}
