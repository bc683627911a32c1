//! Unit tests for the OAuth crate

#[cfg(test)]
mod pkce_tests {
    use crate::domain::value_objects::PkceChallenge;
    use platform::crypto::random_token;

    #[test]
    fn test_generated_verifier_roundtrip() {
        let verifier = random_token(32);
        let challenge = PkceChallenge::from_verifier(&verifier);
        assert!(challenge.verify(&verifier));
    }

    #[test]
    fn test_wrong_verifier_rejected() {
        let challenge = PkceChallenge::from_verifier(&random_token(32));
        assert!(!challenge.verify(&random_token(32)));
    }

    #[test]
    fn test_challenge_is_base64url() {
        let challenge = PkceChallenge::from_verifier(&random_token(32));
        // SHA-256 → 43 unpadded base64url characters
        assert_eq!(challenge.as_str().len(), 43);
        assert!(PkceChallenge::new(challenge.as_str()).is_some());
    }
}

#[cfg(test)]
mod app_tests {
    use crate::domain::entities::OAuthApp;
    use crate::domain::value_objects::ScopeSet;
    use platform::crypto::{hash_token, random_token};

    fn test_app(secret_hash: Option<Vec<u8>>) -> OAuthApp {
        OAuthApp::new(
            "client-123".to_string(),
            secret_hash,
            "Test App",
            vec![
                "https://app.example.com/callback".to_string(),
                "http://localhost:3000/cb".to_string(),
            ],
            ScopeSet::parse("profile email"),
        )
    }

    #[test]
    fn test_redirect_uri_exact_match() {
        let app = test_app(None);
        assert!(app.redirect_uri_allowed("https://app.example.com/callback"));
        assert!(app.redirect_uri_allowed("http://localhost:3000/cb"));
        // No prefix matching
        assert!(!app.redirect_uri_allowed("https://app.example.com/callback/extra"));
        assert!(!app.redirect_uri_allowed("https://app.example.com/"));
    }

    #[test]
    fn test_secret_verification() {
        let secret = random_token(32);
        let app = test_app(Some(hash_token(&secret).to_vec()));

        assert!(app.is_confidential());
        assert!(app.verify_secret(&hash_token(&secret)));
        assert!(!app.verify_secret(&hash_token("wrong")));
    }

    #[test]
    fn test_public_client_has_no_secret() {
        let app = test_app(None);
        assert!(!app.is_confidential());
        assert!(!app.verify_secret(&hash_token("anything")));
    }
}

#[cfg(test)]
mod code_tests {
    use auth::models::user_id::UserId;
    use chrono::{Duration, Utc};
    use kernel::id::OAuthAppId;
    use platform::crypto::{hash_token, random_token};

    use crate::domain::entities::AuthorizationCode;
    use crate::domain::value_objects::{PkceChallenge, ScopeSet};

    fn test_code(ttl: Duration) -> AuthorizationCode {
        AuthorizationCode::new(
            OAuthAppId::new(),
            UserId::new(),
            hash_token(&random_token(32)).to_vec(),
            "https://app.example.com/callback",
            ScopeSet::parse("profile"),
            PkceChallenge::from_verifier(&random_token(32)),
            ttl,
        )
    }

    #[test]
    fn test_fresh_code_usable() {
        let code = test_code(Duration::minutes(10));
        assert!(!code.is_expired());
        assert!(!code.is_used());
    }

    #[test]
    fn test_single_use() {
        let mut code = test_code(Duration::minutes(10));
        code.mark_used();
        assert!(code.is_used());
    }

    #[test]
    fn test_expiry() {
        let mut code = test_code(Duration::minutes(10));
        code.expires_at_ms = Utc::now().timestamp_millis() - 1;
        assert!(code.is_expired());
    }
}

#[cfg(test)]
mod flow_state_tests {
    use chrono::{Duration, Utc};
    use platform::crypto::{hash_token, random_token};

    use crate::domain::entities::LoginFlowState;
    use crate::domain::value_objects::Provider;

    #[test]
    fn test_flow_state_expiry() {
        let mut state = LoginFlowState::new(
            hash_token(&random_token(32)).to_vec(),
            Provider::GitHub,
            random_token(32),
            None,
            Some("/dashboard".to_string()),
            Duration::minutes(10),
        );
        assert!(!state.is_expired());

        state.expires_at_ms = Utc::now().timestamp_millis() - 1;
        assert!(state.is_expired());
    }
}

#[cfg(test)]
mod userinfo_parse_tests {
    use serde_json::json;

    use crate::application::provider_client::parse_user_info;
    use crate::domain::value_objects::Provider;

    #[test]
    fn test_parse_github_userinfo() {
        let body = json!({
            "id": 583231,
            "login": "octocat",
            "name": "The Octocat",
            "email": null,
        });

        let info = parse_user_info(Provider::GitHub, &body).unwrap();
        assert_eq!(info.subject, "583231");
        assert_eq!(info.login.as_deref(), Some("octocat"));
        assert_eq!(info.display_name.as_deref(), Some("The Octocat"));
        assert_eq!(info.email, None);
        // GitHub's /user endpoint never asserts verification
        assert!(!info.email_verified);
    }

    #[test]
    fn test_parse_google_userinfo() {
        let body = json!({
            "sub": "110248495921238986420",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "email_verified": true,
        });

        let info = parse_user_info(Provider::Google, &body).unwrap();
        assert_eq!(info.subject, "110248495921238986420");
        assert_eq!(info.email.as_deref(), Some("ada@example.com"));
        assert!(info.email_verified);
        assert_eq!(info.login, None);
    }

    #[test]
    fn test_parse_google_unverified_email() {
        let body = json!({
            "sub": "1",
            "email": "someone@example.com",
            "email_verified": false,
        });

        let info = parse_user_info(Provider::Google, &body).unwrap();
        assert!(!info.email_verified);
    }

    #[test]
    fn test_parse_missing_subject_fails() {
        assert!(parse_user_info(Provider::GitHub, &serde_json::json!({})).is_err());
        assert!(parse_user_info(Provider::Google, &serde_json::json!({})).is_err());
    }
}
