//! Application Layer
//!
//! Use cases and application services.

pub mod backup_codes;
pub mod check_session;
pub mod config;
pub mod login_history;
pub mod password_reset;
pub mod session_token;
pub mod sessions;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod token_service;
pub mod totp_setup;

// Re-exports
pub use backup_codes::BackupCodeUseCase;
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use login_history::LoginHistoryUseCase;
pub use password_reset::{PasswordResetUseCase, ResetRequestOutput};
pub use sessions::SessionsUseCase;
pub use sign_in::{ClientFingerprint, SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use token_service::{AccessClaims, TokenPairOutput, TokenService, validate_access_token};
pub use totp_setup::{TotpSetupOutput, TotpSetupUseCase, TotpVerifyOutput};
