//! Provider HTTP Client
//!
//! The wire side of external sign-in: authorization-code exchange and
//! userinfo retrieval against the provider's fixed OAuth2 endpoints.

use serde_json::Value;

use crate::application::config::ProviderConfig;
use crate::domain::value_objects::Provider;
use crate::error::{OAuthError, OAuthResult};

/// Identity data extracted from a provider's userinfo response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUserInfo {
    /// Stable provider-side subject identifier
    pub subject: String,
    pub email: Option<String>,
    /// Only trusted for account matching when the provider asserts it
    pub email_verified: bool,
    pub display_name: Option<String>,
    /// Provider-side handle, used to derive a local user name
    pub login: Option<String>,
}

/// Exchange an authorization code for the provider's access token
pub async fn exchange_code(
    config: &ProviderConfig,
    code: &str,
    pkce_verifier: &str,
    redirect_uri: &str,
) -> OAuthResult<String> {
    let client = reqwest::Client::new();
    let response = client
        .post(&config.token_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", pkce_verifier),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| OAuthError::ExchangeFailed(e.to_string()))?;

    let body: Value = response
        .json()
        .await
        .map_err(|e| OAuthError::ExchangeFailed(e.to_string()))?;

    body["access_token"]
        .as_str()
        .map(|t| t.to_string())
        .ok_or_else(|| {
            let err = body["error"].as_str().unwrap_or("unknown");
            let desc = body["error_description"].as_str().unwrap_or("");
            OAuthError::ExchangeFailed(format!("{err} {desc}"))
        })
}

/// Fetch and parse the provider's userinfo for an access token
pub async fn fetch_user_info(
    config: &ProviderConfig,
    access_token: &str,
) -> OAuthResult<ProviderUserInfo> {
    let client = reqwest::Client::new();
    let response = client
        .get(&config.userinfo_url)
        .bearer_auth(access_token)
        .header(reqwest::header::ACCEPT, "application/json")
        // GitHub rejects requests without a User-Agent
        .header(reqwest::header::USER_AGENT, "gatekey")
        .send()
        .await
        .map_err(|e| OAuthError::UserinfoFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(OAuthError::UserinfoFailed(format!(
            "provider returned status {}",
            response.status()
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| OAuthError::UserinfoFailed(e.to_string()))?;

    parse_user_info(config.provider, &body)
}

/// Map a provider-specific userinfo document to [`ProviderUserInfo`]
pub fn parse_user_info(provider: Provider, body: &Value) -> OAuthResult<ProviderUserInfo> {
    match provider {
        Provider::GitHub => {
            let subject = body["id"]
                .as_i64()
                .map(|id| id.to_string())
                .ok_or_else(|| OAuthError::UserinfoFailed("missing id".to_string()))?;

            Ok(ProviderUserInfo {
                subject,
                email: body["email"].as_str().map(|s| s.to_string()),
                // The /user endpoint does not assert verification
                email_verified: false,
                display_name: body["name"].as_str().map(|s| s.to_string()),
                login: body["login"].as_str().map(|s| s.to_string()),
            })
        }
        Provider::Google => {
            let subject = body["sub"]
                .as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| OAuthError::UserinfoFailed("missing sub".to_string()))?;

            Ok(ProviderUserInfo {
                subject,
                email: body["email"].as_str().map(|s| s.to_string()),
                email_verified: body["email_verified"].as_bool().unwrap_or(false),
                display_name: body["name"].as_str().map(|s| s.to_string()),
                login: None,
            })
        }
    }
}
