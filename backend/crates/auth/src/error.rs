//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// User name already exists
    #[error("User name already exists")]
    UserNameTaken,

    /// Email already registered
    #[error("Email is already registered")]
    EmailTaken,

    /// Invalid credentials (wrong password or unknown identifier)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account is locked (too many failed attempts)
    #[error("Account is temporarily locked")]
    AccountLocked,

    /// Account is disabled
    #[error("Account is disabled")]
    AccountDisabled,

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Session fingerprint mismatch
    #[error("Session fingerprint mismatch")]
    SessionFingerprintMismatch,

    /// 2FA required
    #[error("Two-factor authentication required")]
    TwoFactorRequired,

    /// Invalid 2FA code (TOTP or backup code)
    #[error("Invalid two-factor authentication code")]
    InvalidTwoFactorCode,

    /// 2FA not set up
    #[error("Two-factor authentication not set up")]
    TwoFactorNotSetup,

    /// Access or refresh token expired
    #[error("Token has expired")]
    TokenExpired,

    /// Malformed, unknown or revoked token
    #[error("Invalid token")]
    InvalidToken,

    /// A rotated-out refresh token was presented again
    #[error("Refresh token has already been used")]
    RefreshTokenReuse,

    /// Password reset token unknown or already used
    #[error("Invalid password reset token")]
    InvalidResetToken,

    /// Password reset token expired
    #[error("Password reset token has expired")]
    ResetTokenExpired,

    /// Too many requests from this client
    #[error("Too many requests, try again later")]
    RateLimited,

    /// Email required (for moderator+ roles)
    #[error("Email is required for this role")]
    EmailRequired,

    /// Missing required header
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Input validation error (user name, email)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::UserNameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AccountLocked => StatusCode::LOCKED,
            AuthError::AccountDisabled => StatusCode::FORBIDDEN,
            AuthError::SessionInvalid | AuthError::SessionFingerprintMismatch => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::TwoFactorRequired => StatusCode::PRECONDITION_REQUIRED,
            AuthError::InvalidTwoFactorCode => StatusCode::UNAUTHORIZED,
            AuthError::TwoFactorNotSetup => StatusCode::PRECONDITION_FAILED,
            AuthError::TokenExpired
            | AuthError::InvalidToken
            | AuthError::RefreshTokenReuse => StatusCode::UNAUTHORIZED,
            AuthError::InvalidResetToken => StatusCode::BAD_REQUEST,
            AuthError::ResetTokenExpired => StatusCode::GONE,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::EmailRequired => StatusCode::PRECONDITION_FAILED,
            AuthError::MissingHeader(_)
            | AuthError::Validation(_)
            | AuthError::PasswordValidation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::UserNameTaken | AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::SessionFingerprintMismatch
            | AuthError::InvalidTwoFactorCode
            | AuthError::TokenExpired
            | AuthError::InvalidToken
            | AuthError::RefreshTokenReuse => ErrorKind::Unauthorized,
            AuthError::AccountLocked => ErrorKind::Locked,
            AuthError::AccountDisabled => ErrorKind::Forbidden,
            AuthError::TwoFactorRequired => ErrorKind::PreconditionRequired,
            AuthError::TwoFactorNotSetup | AuthError::EmailRequired => {
                ErrorKind::UnprocessableEntity
            }
            AuthError::InvalidResetToken => ErrorKind::BadRequest,
            AuthError::ResetTokenExpired => ErrorKind::Gone,
            AuthError::RateLimited => ErrorKind::TooManyRequests,
            AuthError::MissingHeader(_)
            | AuthError::Validation(_)
            | AuthError::PasswordValidation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::SessionFingerprintMismatch => {
                tracing::warn!("Session fingerprint mismatch detected");
            }
            AuthError::RefreshTokenReuse => {
                tracing::warn!("Refresh token reuse detected, family revoked");
            }
            AuthError::RateLimited => {
                tracing::warn!("Rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::client::FingerprintError> for AuthError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(header) => {
                AuthError::MissingHeader(header)
            }
        }
    }
}
