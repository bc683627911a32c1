//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use auth::{AuthConfig, PgAuthRepository, PgRateLimitStore, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use oauth::{OAuthConfig, PgOAuthRepository, ProviderConfig, oauth_router};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,oauth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired auth/OAuth data
    // Errors here should not prevent server startup
    let auth_store = PgAuthRepository::new(pool.clone());
    match auth_store.cleanup_all_expired().await {
        Ok((sessions, refresh_tokens, reset_tokens)) => {
            tracing::info!(
                sessions_deleted = sessions,
                refresh_tokens_deleted = refresh_tokens,
                reset_tokens_deleted = reset_tokens,
                "Auth cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Auth cleanup failed, continuing anyway");
        }
    }

    let oauth_store = PgOAuthRepository::new(pool.clone());
    match oauth_store.cleanup_all_expired().await {
        Ok((states, codes, tokens)) => {
            tracing::info!(
                login_states_deleted = states,
                codes_deleted = codes,
                access_tokens_deleted = tokens,
                "OAuth cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "OAuth cleanup failed, continuing anyway");
        }
    }

    let rate_store = PgRateLimitStore::new(pool.clone());
    if let Err(e) = rate_store.cleanup_stale().await {
        tracing::warn!(error = %e, "Rate limit cleanup failed, continuing anyway");
    }

    // Auth configuration
    let auth_config = if cfg!(debug_assertions) {
        AuthConfig {
            password_pepper: load_pepper(),
            ..AuthConfig::development()
        }
    } else {
        AuthConfig {
            session_secret: load_secret("SESSION_SECRET")?,
            token_secret: load_secret("TOKEN_SECRET")?,
            password_pepper: load_pepper(),
            ..AuthConfig::default()
        }
    };

    // OAuth configuration: providers are enabled by their credentials
    let mut providers = Vec::new();
    if let (Ok(id), Ok(secret)) = (
        env::var("GITHUB_CLIENT_ID"),
        env::var("GITHUB_CLIENT_SECRET"),
    ) {
        providers.push(ProviderConfig::github(id, secret));
    }
    if let (Ok(id), Ok(secret)) = (
        env::var("GOOGLE_CLIENT_ID"),
        env::var("GOOGLE_CLIENT_SECRET"),
    ) {
        providers.push(ProviderConfig::google(id, secret));
    }
    tracing::info!(providers = providers.len(), "External providers configured");

    let oauth_config = OAuthConfig {
        providers,
        public_base_url: env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8180".to_string()),
        ..OAuthConfig::default()
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            auth_router(
                PgAuthRepository::new(pool.clone()),
                PgRateLimitStore::new(pool.clone()),
                auth_config.clone(),
            ),
        )
        .nest(
            "/api/oauth",
            oauth_router(
                PgOAuthRepository::new(pool.clone()),
                PgAuthRepository::new(pool.clone()),
                oauth_config,
                auth_config,
            ),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8180);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Load a 32-byte base64-encoded secret from the environment
fn load_secret(var: &str) -> anyhow::Result<[u8; 32]> {
    let encoded =
        env::var(var).map_err(|_| anyhow::anyhow!("{var} must be set in production"))?;
    let bytes = general_purpose::STANDARD.decode(&encoded)?;
    if bytes.len() != 32 {
        anyhow::bail!("{var} must decode to exactly 32 bytes (got {})", bytes.len());
    }
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&bytes);
    Ok(secret)
}

/// Optional application-wide password pepper
fn load_pepper() -> Option<Vec<u8>> {
    env::var("PASSWORD_PEPPER")
        .ok()
        .filter(|p| !p.is_empty())
        .map(|p| p.into_bytes())
}
