//! Auth Router

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use platform::rate_limit::RateLimitStore;

use crate::application::config::AuthConfig;
use crate::infra::postgres::PgAuthRepository;
use crate::infra::rate_limit::PgRateLimitStore;
use crate::presentation::handlers::{self, AuthAppState, AuthRepositories};
use crate::presentation::middleware::{AuthMiddlewareState, require_auth_session};

/// Create the Auth router with the PostgreSQL repository
pub fn auth_router(
    repo: PgAuthRepository,
    rate_store: PgRateLimitStore,
    config: AuthConfig,
) -> Router {
    auth_router_generic(repo, rate_store, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R, L>(repo: R, rate_store: L, config: AuthConfig) -> Router
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        rate_store: Arc::new(rate_store),
        config: Arc::new(config),
    };

    let mw_state = AuthMiddlewareState {
        repo: state.repo.clone(),
        config: state.config.clone(),
    };

    // Account-management routes sit behind the session guard; the
    // handlers still resolve the session themselves for the user ID
    let protected = Router::new()
        .route("/signout-all", post(handlers::sign_out_all::<R, L>))
        .route("/sessions", get(handlers::list_sessions::<R, L>))
        .route(
            "/sessions/{session_id}",
            delete(handlers::revoke_session::<R, L>),
        )
        .route("/totp/setup", post(handlers::totp_setup::<R, L>))
        .route("/totp/verify", post(handlers::totp_verify::<R, L>))
        .route("/totp/disable", post(handlers::totp_disable::<R, L>))
        .route("/backup-codes", get(handlers::backup_codes_status::<R, L>))
        .route(
            "/backup-codes/regenerate",
            post(handlers::backup_codes_regenerate::<R, L>),
        )
        .route("/login-history", get(handlers::login_history::<R, L>))
        .route_layer(axum::middleware::from_fn(move |req, next| {
            require_auth_session(mw_state.clone(), req, next)
        }));

    Router::new()
        .route("/signup", post(handlers::sign_up::<R, L>))
        .route("/signin", post(handlers::sign_in::<R, L>))
        .route("/signout", post(handlers::sign_out::<R, L>))
        .route("/status", get(handlers::session_status::<R, L>))
        .route("/token/refresh", post(handlers::token_refresh::<R, L>))
        .route("/token/revoke", post(handlers::token_revoke::<R, L>))
        .route(
            "/password-reset/request",
            post(handlers::password_reset_request::<R, L>),
        )
        .route(
            "/password-reset/confirm",
            post(handlers::password_reset_confirm::<R, L>),
        )
        .merge(protected)
        .with_state(state)
}
