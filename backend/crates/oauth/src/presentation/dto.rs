//! API DTOs (Data Transfer Objects)
//!
//! Own endpoints use camelCase JSON like the rest of the API; the
//! OAuth2 protocol endpoints (token, revoke) speak RFC 6749
//! form/JSON conventions instead.

use serde::{Deserialize, Serialize};

// ============================================================================
// Providers
// ============================================================================

/// One enabled external provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub slug: String,
    pub display_name: String,
}

/// Enabled provider list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderInfo>,
}

// ============================================================================
// Connect / Callback
// ============================================================================

/// Query parameters for starting an external sign-in
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    /// Where the UI wants to land after the callback
    pub redirect_to: Option<String>,
}

/// Query parameters delivered by the provider redirect
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set when the user denied the provider consent screen
    pub error: Option<String>,
}

/// Callback result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    pub public_id: String,
    /// The account has TOTP enabled; finish sign-in with credentials + code
    pub requires_2fa: bool,
    /// This flow linked an identity instead of signing in
    pub linked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

// ============================================================================
// Linked Identities
// ============================================================================

/// One linked provider identity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityInfo {
    pub provider: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub linked_at_ms: i64,
}

/// Linked identity list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityListResponse {
    pub identities: Vec<IdentityInfo>,
}

// ============================================================================
// Authorization Server (RFC 6749/7009 shapes)
// ============================================================================

/// Query parameters of the authorization endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeQuery {
    pub response_type: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
}

/// Form body of the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequestForm {
    pub grant_type: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub redirect_uri: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub code_verifier: String,
}

/// Successful token response (RFC 6749 §5.1)
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: String,
}

/// Error token response (RFC 6749 §5.2)
#[derive(Debug, Clone, Serialize)]
pub struct TokenErrorResponse {
    pub error: String,
    pub error_description: String,
}

/// Form body of the revocation endpoint (RFC 7009)
#[derive(Debug, Clone, Deserialize)]
pub struct RevokeForm {
    pub token: String,
}

/// Userinfo response for bearer access tokens
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserinfoResponse {
    pub sub: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ============================================================================
// App Registration (admin)
// ============================================================================

/// App registration request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAppRequest {
    pub name: String,
    pub redirect_uris: Vec<String>,
    /// Space-separated scopes the app may request
    pub allowed_scopes: String,
    #[serde(default = "default_confidential")]
    pub confidential: bool,
}

fn default_confidential() -> bool {
    true
}

/// App registration response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAppResponse {
    pub client_id: String,
    /// Plain secret, shown exactly once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// One registered app (listing, no secrets)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub client_id: String,
    pub name: String,
    pub redirect_uris: Vec<String>,
    pub allowed_scopes: String,
    pub confidential: bool,
}

/// Registered app list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppListResponse {
    pub apps: Vec<AppInfo>,
}
