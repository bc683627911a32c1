//! TOTP Setup Use Case
//!
//! Set up, verify and disable TOTP two-factor authentication.
//! Verification also provisions a fresh batch of backup codes.

use std::sync::Arc;

use crate::domain::entity::backup_code::generate_backup_codes;
use crate::domain::repository::{AuthRepository, BackupCodeRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// TOTP setup output
pub struct TotpSetupOutput {
    /// QR code as base64-encoded PNG
    pub qr_code_base64: String,
    /// Secret for manual entry
    pub secret: String,
    /// otpauth:// URL
    pub otpauth_url: String,
}

/// TOTP verify output
pub struct TotpVerifyOutput {
    /// Fresh backup codes, displayed exactly once
    pub backup_codes: Vec<String>,
}

/// TOTP setup use case
pub struct TotpSetupUseCase<U, A, B>
where
    U: UserRepository,
    A: AuthRepository,
    B: BackupCodeRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    backup_repo: Arc<B>,
}

impl<U, A, B> TotpSetupUseCase<U, A, B>
where
    U: UserRepository,
    A: AuthRepository,
    B: BackupCodeRepository,
{
    pub fn new(user_repo: Arc<U>, auth_repo: Arc<A>, backup_repo: Arc<B>) -> Self {
        Self {
            user_repo,
            auth_repo,
            backup_repo,
        }
    }

    /// Start TOTP setup - generates new secret
    pub async fn setup(&self, user_id: &UserId) -> AuthResult<TotpSetupOutput> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let mut auth = self
            .auth_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(AuthError::Internal("Auth not found".to_string()))?;

        // Generate new TOTP secret (not enabled until verified)
        let secret = auth.setup_totp();

        self.auth_repo.update(&auth).await?;

        let account_name = user.user_name.as_str();

        let qr_code = secret
            .generate_qr_code(account_name)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let otpauth_url = secret
            .get_otpauth_url(account_name)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(
            user_id = %user_id,
            "TOTP setup initiated"
        );

        Ok(TotpSetupOutput {
            qr_code_base64: qr_code,
            secret: secret.as_base32().to_string(),
            otpauth_url,
        })
    }

    /// Verify TOTP code, enable 2FA and provision backup codes
    pub async fn verify(&self, user_id: &UserId, code: &str) -> AuthResult<TotpVerifyOutput> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let mut auth = self
            .auth_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(AuthError::Internal("Auth not found".to_string()))?;

        let secret = auth.totp_secret.as_ref().ok_or(AuthError::TwoFactorNotSetup)?;

        let valid = secret
            .verify(code, user.user_name.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        auth.enable_totp();
        self.auth_repo.update(&auth).await?;

        // Replace any previous batch with fresh backup codes
        let generated = generate_backup_codes(user_id);
        self.backup_repo.replace_all(user_id, &generated.codes).await?;

        tracing::info!(
            user_id = %user_id,
            "TOTP enabled, backup codes provisioned"
        );

        Ok(TotpVerifyOutput {
            backup_codes: generated.plain_codes,
        })
    }

    /// Disable TOTP and delete remaining backup codes
    pub async fn disable(&self, user_id: &UserId, code: &str) -> AuthResult<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let mut auth = self
            .auth_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(AuthError::Internal("Auth not found".to_string()))?;

        // Moderator+ cannot disable TOTP
        if user.requires_2fa() {
            return Err(AuthError::Internal(
                "Users with elevated privileges cannot disable 2FA".to_string(),
            ));
        }

        // Verify current TOTP code before disabling
        if let Some(secret) = &auth.totp_secret {
            let valid = secret
                .verify(code, user.user_name.as_str())
                .map_err(|e| AuthError::Internal(e.to_string()))?;

            if !valid {
                return Err(AuthError::InvalidTwoFactorCode);
            }
        }

        auth.disable_totp();
        self.auth_repo.update(&auth).await?;

        let deleted = self.backup_repo.delete_all(user_id).await?;

        tracing::info!(
            user_id = %user_id,
            backup_codes_deleted = deleted,
            "TOTP disabled"
        );

        Ok(())
    }
}
