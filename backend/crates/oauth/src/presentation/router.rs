//! OAuth Router

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use auth::application::config::AuthConfig;
use auth::infra::postgres::PgAuthRepository;
use auth::presentation::AuthRepositories;

use crate::application::config::OAuthConfig;
use crate::domain::repository::OAuthRepositories;
use crate::infra::postgres::PgOAuthRepository;
use crate::presentation::handlers::{self, OAuthAppState};

/// Create the OAuth router with the PostgreSQL repositories
pub fn oauth_router(
    oauth_repo: PgOAuthRepository,
    auth_repo: PgAuthRepository,
    oauth_config: OAuthConfig,
    auth_config: AuthConfig,
) -> Router {
    oauth_router_generic(oauth_repo, auth_repo, oauth_config, auth_config)
}

/// Create a generic OAuth router for any repository implementations
pub fn oauth_router_generic<O, R>(
    oauth_repo: O,
    auth_repo: R,
    oauth_config: OAuthConfig,
    auth_config: AuthConfig,
) -> Router
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let state = OAuthAppState {
        oauth_repo: Arc::new(oauth_repo),
        auth_repo: Arc::new(auth_repo),
        oauth_config: Arc::new(oauth_config),
        auth_config: Arc::new(auth_config),
    };

    Router::new()
        .route("/providers", get(handlers::list_providers::<O, R>))
        .route("/connect/{provider}", get(handlers::connect::<O, R>))
        .route("/callback/{provider}", get(handlers::callback::<O, R>))
        .route("/identities", get(handlers::list_identities::<O, R>))
        .route(
            "/identities/{provider}",
            delete(handlers::unlink_identity::<O, R>),
        )
        .route("/authorize", get(handlers::authorize::<O, R>))
        .route("/token", post(handlers::token::<O, R>))
        .route("/revoke", post(handlers::revoke::<O, R>))
        .route("/userinfo", get(handlers::userinfo::<O, R>))
        .route(
            "/apps",
            post(handlers::register_app::<O, R>).get(handlers::list_apps::<O, R>),
        )
        .with_state(state)
}
