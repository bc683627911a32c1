//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use auth::models::user_id::UserId;

use crate::domain::entities::{
    AccessToken, AuthorizationCode, LoginFlowState, OAuthApp, OAuthIdentity,
};
use crate::domain::value_objects::Provider;
use crate::error::OAuthResult;

/// Provider identity repository trait
#[trait_variant::make(IdentityRepository: Send)]
pub trait LocalIdentityRepository {
    /// Bind a provider identity to a user
    async fn create(&self, identity: &OAuthIdentity) -> OAuthResult<()>;

    /// Find by provider and provider-side subject
    async fn find_by_subject(
        &self,
        provider: Provider,
        subject: &str,
    ) -> OAuthResult<Option<OAuthIdentity>>;

    /// List identities bound to a user
    async fn find_by_user_id(&self, user_id: &UserId) -> OAuthResult<Vec<OAuthIdentity>>;

    /// Update provider-reported metadata
    async fn update(&self, identity: &OAuthIdentity) -> OAuthResult<()>;

    /// Unlink an identity from a user
    async fn delete(&self, provider: Provider, user_id: &UserId) -> OAuthResult<u64>;
}

/// Login flow state repository trait
#[trait_variant::make(LoginStateRepository: Send)]
pub trait LocalLoginStateRepository {
    /// Persist flow state for an outbound provider redirect
    async fn create(&self, state: &LoginFlowState) -> OAuthResult<()>;

    /// Atomically consume (delete and return) the state behind a hash
    async fn consume_by_hash(&self, state_hash: &[u8]) -> OAuthResult<Option<LoginFlowState>>;

    /// Clean up expired flow state
    async fn cleanup_expired(&self) -> OAuthResult<u64>;
}

/// OAuth application repository trait
#[trait_variant::make(OAuthAppRepository: Send)]
pub trait LocalOAuthAppRepository {
    /// Register a new application
    async fn create(&self, app: &OAuthApp) -> OAuthResult<()>;

    /// Find an application by its public client_id
    async fn find_by_client_id(&self, client_id: &str) -> OAuthResult<Option<OAuthApp>>;

    /// List registered applications
    async fn list(&self) -> OAuthResult<Vec<OAuthApp>>;
}

/// Authorization code repository trait
#[trait_variant::make(AuthorizationCodeRepository: Send)]
pub trait LocalAuthorizationCodeRepository {
    /// Store a freshly issued code
    async fn create(&self, code: &AuthorizationCode) -> OAuthResult<()>;

    /// Find a code by the hash of its opaque value
    async fn find_by_hash(&self, code_hash: &[u8]) -> OAuthResult<Option<AuthorizationCode>>;

    /// Mark a code as used. Fails when it was already consumed.
    async fn mark_used(&self, code: &AuthorizationCode) -> OAuthResult<()>;

    /// Clean up expired codes
    async fn cleanup_expired(&self) -> OAuthResult<u64>;
}

/// Access token repository trait
#[trait_variant::make(AccessTokenRepository: Send)]
pub trait LocalAccessTokenRepository {
    /// Store a freshly issued token
    async fn create(&self, token: &AccessToken) -> OAuthResult<()>;

    /// Find a token by the hash of its opaque value
    async fn find_by_hash(&self, token_hash: &[u8]) -> OAuthResult<Option<AccessToken>>;

    /// Revoke the token behind a hash. Idempotent.
    async fn revoke_by_hash(&self, token_hash: &[u8]) -> OAuthResult<u64>;

    /// Clean up expired tokens
    async fn cleanup_expired(&self) -> OAuthResult<u64>;
}

/// Everything the OAuth use cases need from persistence
///
/// Implemented automatically for any type providing all the repository
/// traits (in practice `PgOAuthRepository`).
pub trait OAuthRepositories:
    IdentityRepository
    + LoginStateRepository
    + OAuthAppRepository
    + AuthorizationCodeRepository
    + AccessTokenRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> OAuthRepositories for T where
    T: IdentityRepository
        + LoginStateRepository
        + OAuthAppRepository
        + AuthorizationCodeRepository
        + AccessTokenRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
