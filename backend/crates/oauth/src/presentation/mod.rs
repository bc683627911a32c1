//! Presentation Layer
//!
//! HTTP handlers, DTOs, and router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::OAuthAppState;
pub use router::{oauth_router, oauth_router_generic};
