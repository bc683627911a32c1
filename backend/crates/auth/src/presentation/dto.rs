//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub user_name: String,
    /// Optional contact email (enables password reset)
    pub email: Option<String>,
    pub password: String,
}

/// Sign up response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub public_id: String,
}

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// User name or email
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    /// TOTP code if 2FA is enabled
    pub totp_code: Option<String>,
    /// Backup code as 2FA fallback
    pub backup_code: Option<String>,
    /// Also issue an access/refresh token pair (API clients)
    #[serde(default)]
    pub with_tokens: bool,
}

/// Sign in response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub public_id: String,
    /// True if 2FA is required (resubmit with totpCode or backupCode)
    pub requires_2fa: bool,
    /// Token pair, when requested via withTokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenPairResponse>,
}

// ============================================================================
// Tokens
// ============================================================================

/// Access/refresh token pair
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub token_type: String,
    /// Access token validity in seconds
    pub expires_in: i64,
    pub refresh_token: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshRequest {
    pub refresh_token: String,
}

/// Token revoke request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRevokeRequest {
    pub refresh_token: String,
}

// ============================================================================
// Session Status / Management
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub public_id: Option<String>,
    pub user_role: Option<String>,
    pub expires_at_ms: Option<i64>,
}

/// One active session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub user_agent: Option<String>,
    pub client_ip: Option<String>,
    pub created_at_ms: i64,
    pub last_activity_at_ms: i64,
    pub is_current: bool,
}

/// Active session list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
}

// ============================================================================
// TOTP Setup
// ============================================================================

/// TOTP setup response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpSetupResponse {
    /// QR code as base64-encoded PNG
    pub qr_code: String,
    /// Secret for manual entry
    pub secret: String,
    /// otpauth:// URL
    pub otpauth_url: String,
}

/// TOTP verify request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpVerifyRequest {
    pub code: String,
}

/// TOTP verify response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpVerifyResponse {
    /// Fresh backup codes, shown exactly once
    pub backup_codes: Vec<String>,
}

/// TOTP disable request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpDisableRequest {
    /// Current TOTP code to confirm disable
    pub code: String,
}

// ============================================================================
// Backup Codes
// ============================================================================

/// Backup code regeneration request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCodesRegenerateRequest {
    /// Current TOTP code
    pub totp_code: String,
}

/// Freshly generated backup codes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCodesResponse {
    pub backup_codes: Vec<String>,
}

/// Remaining backup code count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCodesStatusResponse {
    pub remaining: u32,
}

// ============================================================================
// Password Reset
// ============================================================================

/// Password reset request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequestBody {
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmBody {
    pub token: String,
    pub new_password: String,
}

// ============================================================================
// Login History
// ============================================================================

/// One sign-in attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAttemptResponse {
    pub success: bool,
    pub identifier: String,
    pub failure_reason: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at_ms: i64,
}

/// Recent sign-in attempts, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHistoryResponse {
    pub attempts: Vec<LoginAttemptResponse>,
}
