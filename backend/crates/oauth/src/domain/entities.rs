//! Domain Entities
//!
//! Core business entities for the OAuth domain.

use auth::models::user_id::UserId;
use chrono::{DateTime, Duration, Utc};
use kernel::id::{AuthorizationCodeId, OAuthAppId};
use platform::crypto::constant_time_eq;
use uuid::Uuid;

use crate::domain::value_objects::{PkceChallenge, Provider, ScopeSet};

/// A provider identity bound to a local user
#[derive(Debug, Clone)]
pub struct OAuthIdentity {
    pub identity_id: Uuid,
    /// Local user this identity signs in as
    pub user_id: UserId,
    pub provider: Provider,
    /// Provider-specific stable subject identifier
    pub provider_subject: String,
    /// Email reported by the provider (informational)
    pub email: Option<String>,
    /// Display name reported by the provider
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OAuthIdentity {
    pub fn new(
        user_id: UserId,
        provider: Provider,
        provider_subject: impl Into<String>,
        email: Option<String>,
        display_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            identity_id: Uuid::new_v4(),
            user_id,
            provider,
            provider_subject: provider_subject.into(),
            email,
            display_name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the provider-reported metadata
    pub fn update_profile(&mut self, email: Option<String>, display_name: Option<String>) {
        self.email = email;
        self.display_name = display_name;
        self.updated_at = Utc::now();
    }
}

/// Server-side state for an in-flight external sign-in
///
/// Single-use: consumed (deleted) when the callback arrives.
#[derive(Debug, Clone)]
pub struct LoginFlowState {
    pub state_id: Uuid,
    /// SHA-256 hash of the state parameter round-tripped via the provider
    pub state_hash: Vec<u8>,
    pub provider: Provider,
    /// PKCE verifier kept server-side until the code exchange
    pub pkce_verifier: String,
    /// Signed-in user when this flow links an identity instead of signing in
    pub link_user_id: Option<UserId>,
    /// Where the UI wants to land after the callback
    pub redirect_to: Option<String>,
    pub expires_at_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl LoginFlowState {
    pub fn new(
        state_hash: Vec<u8>,
        provider: Provider,
        pkce_verifier: String,
        link_user_id: Option<UserId>,
        redirect_to: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            state_id: Uuid::new_v4(),
            state_hash,
            provider,
            pkce_verifier,
            link_user_id,
            redirect_to,
            expires_at_ms: (now + ttl).timestamp_millis(),
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }
}

/// A registered third-party client application
#[derive(Debug, Clone)]
pub struct OAuthApp {
    pub app_id: OAuthAppId,
    /// Public client identifier (nanoid)
    pub client_id: String,
    /// SHA-256 hash of the client secret (None for public clients)
    pub client_secret_hash: Option<Vec<u8>>,
    pub name: String,
    /// Exact-match redirect URIs
    pub redirect_uris: Vec<String>,
    /// Scopes the app may request
    pub allowed_scopes: ScopeSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OAuthApp {
    pub fn new(
        client_id: String,
        client_secret_hash: Option<Vec<u8>>,
        name: impl Into<String>,
        redirect_uris: Vec<String>,
        allowed_scopes: ScopeSet,
    ) -> Self {
        let now = Utc::now();
        Self {
            app_id: OAuthAppId::new(),
            client_id,
            client_secret_hash,
            name: name.into(),
            redirect_uris,
            allowed_scopes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the app authenticates with a secret (confidential client)
    pub fn is_confidential(&self) -> bool {
        self.client_secret_hash.is_some()
    }

    /// Verify a presented client secret in constant time
    pub fn verify_secret(&self, secret_hash: &[u8]) -> bool {
        match &self.client_secret_hash {
            Some(stored) => constant_time_eq(stored, secret_hash),
            None => false,
        }
    }

    /// Redirect URIs match exactly, no prefix or wildcard logic
    pub fn redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|u| u == uri)
    }
}

/// A single-use authorization code
#[derive(Debug, Clone)]
pub struct AuthorizationCode {
    pub code_id: AuthorizationCodeId,
    pub app_id: OAuthAppId,
    pub user_id: UserId,
    /// SHA-256 hash of the opaque code
    pub code_hash: Vec<u8>,
    /// The redirect URI the code was issued for
    pub redirect_uri: String,
    pub scope: ScopeSet,
    /// PKCE S256 challenge the token request must answer
    pub code_challenge: PkceChallenge,
    pub expires_at_ms: i64,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AuthorizationCode {
    pub fn new(
        app_id: OAuthAppId,
        user_id: UserId,
        code_hash: Vec<u8>,
        redirect_uri: impl Into<String>,
        scope: ScopeSet,
        code_challenge: PkceChallenge,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            code_id: AuthorizationCodeId::new(),
            app_id,
            user_id,
            code_hash,
            redirect_uri: redirect_uri.into(),
            scope,
            code_challenge,
            expires_at_ms: (now + ttl).timestamp_millis(),
            used_at: None,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn mark_used(&mut self) {
        self.used_at = Some(Utc::now());
    }
}

/// An opaque access token issued to a third-party app
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token_id: Uuid,
    pub app_id: OAuthAppId,
    pub user_id: UserId,
    /// SHA-256 hash of the opaque token
    pub token_hash: Vec<u8>,
    pub scope: ScopeSet,
    pub expires_at_ms: i64,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(
        app_id: OAuthAppId,
        user_id: UserId,
        token_hash: Vec<u8>,
        scope: ScopeSet,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            token_id: Uuid::new_v4(),
            app_id,
            user_id,
            token_hash,
            scope,
            expires_at_ms: (now + ttl).timestamp_millis(),
            revoked_at: None,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }
}
