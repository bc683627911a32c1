//! OAuth Backend Module
//!
//! Both sides of OAuth2 for the identity service:
//! - Sign-in through external providers (GitHub, Google) with PKCE
//! - Authorization server for third-party apps (authorization-code
//!   grant with mandatory PKCE S256)
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers
//!
//! ## Security Model
//! - Provider flow state is server-side, single-use and expiring
//! - Client secrets, authorization codes and access tokens are stored
//!   as SHA-256 hashes only
//! - Authorization codes are single-use with a 10-minute TTL
//! - PKCE S256 is mandatory in both roles

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{OAuthConfig, ProviderConfig};
pub use error::{OAuthError, OAuthResult};
pub use infra::postgres::PgOAuthRepository;
pub use presentation::router::oauth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgOAuthRepository as OAuthStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

#[cfg(test)]
mod tests;
