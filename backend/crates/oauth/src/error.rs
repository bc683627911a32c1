//! OAuth Error Types
//!
//! This module provides OAuth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system. The token
//! endpoint renders errors in the RFC 6749 format instead; see
//! `presentation::handlers`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// OAuth-specific result type alias
pub type OAuthResult<T> = Result<T, OAuthError>;

/// OAuth-specific error variants
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Unknown or disabled external provider
    #[error("Unknown provider: {0}")]
    ProviderNotFound(String),

    /// Login flow state missing, expired or already consumed
    #[error("Login state is invalid or expired")]
    StateInvalid,

    /// Code exchange with the provider failed
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    /// Userinfo fetch from the provider failed
    #[error("Failed to fetch user info: {0}")]
    UserinfoFailed(String),

    /// The provider identity is already linked to another account
    #[error("This external identity is already linked to another account")]
    IdentityConflict,

    /// No identity from this provider is linked to the account
    #[error("No linked identity for this provider")]
    IdentityNotFound,

    /// Sign-in requires an authenticated session first
    #[error("Authentication required")]
    SessionRequired,

    /// Caller lacks the admin role
    #[error("Administrator role required")]
    AdminRequired,

    /// Unknown OAuth client application
    #[error("Unknown client application")]
    AppNotFound,

    /// Redirect URI is not registered for the application
    #[error("Redirect URI is not registered for this application")]
    RedirectUriMismatch,

    /// Requested scope exceeds what the application is allowed
    #[error("Requested scope is not allowed for this application")]
    InvalidScope,

    /// PKCE S256 challenge missing or malformed
    #[error("PKCE code challenge (S256) is required")]
    PkceRequired,

    /// PKCE verifier does not match the stored challenge
    #[error("PKCE verification failed")]
    PkceMismatch,

    /// Authorization code unknown, expired or already used
    #[error("Authorization code is invalid or expired")]
    CodeInvalid,

    /// Client authentication failed
    #[error("Client authentication failed")]
    ClientAuthFailed,

    /// Grant type other than authorization_code
    #[error("Unsupported grant type: {0}")]
    UnsupportedGrantType(String),

    /// Bearer access token unknown, expired or revoked
    #[error("Access token is invalid or expired")]
    TokenInvalid,

    /// Errors bubbling up from the auth domain (sessions, users)
    #[error(transparent)]
    Auth(#[from] auth::AuthError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OAuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            OAuthError::ProviderNotFound(_)
            | OAuthError::AppNotFound
            | OAuthError::IdentityNotFound => StatusCode::NOT_FOUND,
            OAuthError::StateInvalid | OAuthError::CodeInvalid => StatusCode::BAD_REQUEST,
            OAuthError::ExchangeFailed(_) | OAuthError::UserinfoFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
            OAuthError::IdentityConflict => StatusCode::CONFLICT,
            OAuthError::AdminRequired => StatusCode::FORBIDDEN,
            OAuthError::SessionRequired
            | OAuthError::ClientAuthFailed
            | OAuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
            OAuthError::RedirectUriMismatch
            | OAuthError::InvalidScope
            | OAuthError::PkceRequired
            | OAuthError::PkceMismatch
            | OAuthError::UnsupportedGrantType(_) => StatusCode::BAD_REQUEST,
            OAuthError::Auth(e) => e.status_code(),
            OAuthError::Database(_) | OAuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            OAuthError::ProviderNotFound(_)
            | OAuthError::AppNotFound
            | OAuthError::IdentityNotFound => ErrorKind::NotFound,
            OAuthError::StateInvalid
            | OAuthError::CodeInvalid
            | OAuthError::RedirectUriMismatch
            | OAuthError::InvalidScope
            | OAuthError::PkceRequired
            | OAuthError::PkceMismatch
            | OAuthError::UnsupportedGrantType(_) => ErrorKind::BadRequest,
            OAuthError::ExchangeFailed(_) | OAuthError::UserinfoFailed(_) => {
                ErrorKind::ServiceUnavailable
            }
            OAuthError::IdentityConflict => ErrorKind::Conflict,
            OAuthError::AdminRequired => ErrorKind::Forbidden,
            OAuthError::SessionRequired
            | OAuthError::ClientAuthFailed
            | OAuthError::TokenInvalid => ErrorKind::Unauthorized,
            OAuthError::Auth(e) => e.kind(),
            OAuthError::Database(_) | OAuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// RFC 6749 error code for the token endpoint
    pub fn rfc_error_code(&self) -> &'static str {
        match self {
            OAuthError::ClientAuthFailed | OAuthError::AppNotFound => "invalid_client",
            OAuthError::CodeInvalid
            | OAuthError::PkceMismatch
            | OAuthError::RedirectUriMismatch => "invalid_grant",
            OAuthError::UnsupportedGrantType(_) => "unsupported_grant_type",
            OAuthError::InvalidScope => "invalid_scope",
            OAuthError::PkceRequired => "invalid_request",
            _ => "invalid_request",
        }
    }

    fn log(&self) {
        match self {
            OAuthError::Database(e) => {
                tracing::error!(error = %e, "OAuth database error");
            }
            OAuthError::Internal(msg) => {
                tracing::error!(message = %msg, "OAuth internal error");
            }
            OAuthError::ExchangeFailed(msg) | OAuthError::UserinfoFailed(msg) => {
                tracing::warn!(message = %msg, "Provider call failed");
            }
            OAuthError::ClientAuthFailed => {
                tracing::warn!("OAuth client authentication failed");
            }
            _ => {
                tracing::debug!(error = %self, "OAuth error");
            }
        }
    }
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        match self {
            OAuthError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

impl From<platform::client::FingerprintError> for OAuthError {
    fn from(err: platform::client::FingerprintError) -> Self {
        OAuthError::Auth(err.into())
    }
}
