//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entities;
pub mod repository;
pub mod value_objects;

// Re-exports
pub use entities::{AccessToken, AuthorizationCode, LoginFlowState, OAuthApp, OAuthIdentity};
pub use value_objects::{PkceChallenge, Provider, ScopeSet};
