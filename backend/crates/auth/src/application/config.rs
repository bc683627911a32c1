//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Secret key for HMAC-signing session tokens (32 bytes)
    pub session_secret: [u8; 32],
    /// Secret key for HS256 access tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Session TTL without "Remember Me"
    pub session_ttl_short: Duration,
    /// Session TTL with "Remember Me"
    pub session_ttl_long: Duration,
    /// Access token TTL
    pub access_token_ttl: Duration,
    /// Refresh token TTL
    pub refresh_token_ttl: Duration,
    /// Password reset token TTL
    pub reset_token_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "gatekey_session".to_string(),
            session_secret: [0u8; 32],
            token_secret: [0u8; 32],
            session_ttl_short: Duration::from_secs(12 * 3600), // 12 hours
            session_ttl_long: Duration::from_secs(7 * 24 * 3600), // 1 week
            access_token_ttl: Duration::from_secs(15 * 60),    // 15 minutes
            refresh_token_ttl: Duration::from_secs(30 * 24 * 3600), // 30 days
            reset_token_ttl: Duration::from_secs(3600),        // 1 hour
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with random secrets (for development)
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;
        let mut session_secret = [0u8; 32];
        rand::rng().fill_bytes(&mut session_secret);
        let mut token_secret = [0u8; 32];
        rand::rng().fill_bytes(&mut token_secret);
        Self {
            session_secret,
            token_secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secrets()
        }
    }

    /// Access token TTL in whole seconds
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_ttl.as_secs() as i64
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
