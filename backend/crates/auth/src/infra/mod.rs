//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod postgres;
pub mod rate_limit;

pub use postgres::PgAuthRepository;
pub use rate_limit::PgRateLimitStore;
