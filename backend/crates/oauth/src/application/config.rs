//! Application Configuration
//!
//! Configuration for the OAuth application layer.

use std::time::Duration;

use crate::domain::value_objects::Provider;

/// One external provider's endpoints and credentials
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Space-separated scopes requested from the provider
    pub scopes: String,
}

impl ProviderConfig {
    /// GitHub with its fixed OAuth2 endpoints
    pub fn github(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            provider: Provider::GitHub,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            userinfo_url: "https://api.github.com/user".to_string(),
            scopes: "read:user user:email".to_string(),
        }
    }

    /// Google with its fixed OAuth2 endpoints
    pub fn google(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            provider: Provider::Google,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            scopes: "openid email profile".to_string(),
        }
    }
}

/// OAuth application configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Enabled external providers
    pub providers: Vec<ProviderConfig>,
    /// Public base URL of this service, used to build callback URIs
    pub public_base_url: String,
    /// TTL for in-flight provider sign-in state
    pub login_state_ttl: Duration,
    /// TTL for authorization codes issued to third-party apps
    pub auth_code_ttl: Duration,
    /// TTL for access tokens issued to third-party apps
    pub access_token_ttl: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            public_base_url: "http://localhost:31113".to_string(),
            login_state_ttl: Duration::from_secs(600),   // 10 minutes
            auth_code_ttl: Duration::from_secs(600),     // 10 minutes
            access_token_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl OAuthConfig {
    /// Look up the config for an enabled provider
    pub fn provider(&self, provider: Provider) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.provider == provider)
    }

    /// The callback URI registered with the provider
    pub fn callback_uri(&self, provider: Provider) -> String {
        format!(
            "{}/api/oauth/callback/{}",
            self.public_base_url.trim_end_matches('/'),
            provider.slug()
        )
    }
}
