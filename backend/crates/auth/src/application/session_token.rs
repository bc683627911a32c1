//! Session Token Signing
//!
//! Cookie session tokens are `<session_id>.<signature>` where the
//! signature is HMAC-SHA256 over the session ID, base64url-encoded.
//! The database holds the session row; the cookie only proves the
//! client was handed this session ID by us.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Sign a session ID into a cookie token
pub fn sign_session_token(secret: &[u8; 32], session_id: Uuid) -> String {
    let session_id = session_id.to_string();

    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(session_id.as_bytes());
    let signature = mac.finalize().into_bytes();

    format!(
        "{}.{}",
        session_id,
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(signature)
    )
}

/// Verify a cookie token and extract the session ID
pub fn verify_session_token(secret: &[u8; 32], token: &str) -> AuthResult<Uuid> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(AuthError::SessionInvalid);
    }

    let session_id_str = parts[0];
    let signature_b64 = parts[1];

    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(session_id_str.as_bytes());

    let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::SessionInvalid)?;

    mac.verify_slice(&signature)
        .map_err(|_| AuthError::SessionInvalid)?;

    session_id_str
        .parse()
        .map_err(|_| AuthError::SessionInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let secret = [7u8; 32];
        let session_id = Uuid::new_v4();

        let token = sign_session_token(&secret, session_id);
        let parsed = verify_session_token(&secret, &token).unwrap();
        assert_eq!(parsed, session_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_session_token(&[1u8; 32], Uuid::new_v4());
        assert!(verify_session_token(&[2u8; 32], &token).is_err());
    }

    #[test]
    fn test_tampered_session_id_rejected() {
        let secret = [7u8; 32];
        let token = sign_session_token(&secret, Uuid::new_v4());
        let signature = token.split('.').nth(1).unwrap();
        let forged = format!("{}.{}", Uuid::new_v4(), signature);
        assert!(verify_session_token(&secret, &forged).is_err());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let secret = [7u8; 32];
        for token in ["", "no-dot", "a.b.c", "notauuid.c2ln"] {
            assert!(verify_session_token(&secret, token).is_err(), "{token}");
        }
    }
}
