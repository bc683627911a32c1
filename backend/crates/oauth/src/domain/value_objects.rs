//! Domain Value Objects
//!
//! Immutable value types for the OAuth domain.

use platform::crypto::{constant_time_eq, sha256, to_base64url};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported external identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    GitHub,
    Google,
}

impl Provider {
    /// URL/database slug
    pub const fn slug(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::Google => "google",
        }
    }

    /// Human-readable name for sign-in buttons
    pub const fn display_name(&self) -> &'static str {
        match self {
            Provider::GitHub => "GitHub",
            Provider::Google => "Google",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "github" => Some(Provider::GitHub),
            "google" => Some(Provider::Google),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// An ordered, deduplicated set of OAuth scopes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeSet(Vec<String>);

impl ScopeSet {
    /// Parse a space-separated scope string
    pub fn parse(raw: &str) -> Self {
        let mut scopes: Vec<String> = raw
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();
        scopes.sort();
        scopes.dedup();
        Self(scopes)
    }

    /// Build from already-split scope values
    pub fn from_vec(mut scopes: Vec<String>) -> Self {
        scopes.sort();
        scopes.dedup();
        Self(scopes)
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.iter().any(|s| s == scope)
    }

    /// True when every scope in `self` appears in `allowed`
    pub fn is_subset_of(&self, allowed: &ScopeSet) -> bool {
        self.0.iter().all(|s| allowed.contains(s))
    }

    /// Space-separated wire format
    pub fn as_str(&self) -> String {
        self.0.join(" ")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// PKCE S256 challenge
///
/// `challenge = BASE64URL(SHA256(verifier))` per RFC 7636.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Wrap a challenge string received from a client
    ///
    /// RFC 7636 requires 43..=128 characters of the unreserved set.
    pub fn new(challenge: impl Into<String>) -> Option<Self> {
        let challenge = challenge.into();
        let len = challenge.len();
        if !(43..=128).contains(&len) {
            return None;
        }
        if !challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
        {
            return None;
        }
        Some(Self(challenge))
    }

    /// Derive the challenge for a verifier we generated ourselves
    pub fn from_verifier(verifier: &str) -> Self {
        Self(to_base64url(&sha256(verifier.as_bytes())))
    }

    /// Check a verifier against this challenge in constant time
    pub fn verify(&self, verifier: &str) -> bool {
        let derived = to_base64url(&sha256(verifier.as_bytes()));
        constant_time_eq(derived.as_bytes(), self.0.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_slug_roundtrip() {
        assert_eq!(Provider::from_slug("github"), Some(Provider::GitHub));
        assert_eq!(Provider::from_slug("google"), Some(Provider::Google));
        assert_eq!(Provider::from_slug("gitlab"), None);
        assert_eq!(Provider::GitHub.slug(), "github");
    }

    #[test]
    fn test_scope_set_parse() {
        let scopes = ScopeSet::parse("profile email  profile");
        assert_eq!(scopes.as_str(), "email profile");
        assert!(scopes.contains("email"));
        assert!(!scopes.contains("admin"));
    }

    #[test]
    fn test_scope_subset() {
        let allowed = ScopeSet::parse("profile email openid");
        assert!(ScopeSet::parse("email").is_subset_of(&allowed));
        assert!(ScopeSet::parse("email profile").is_subset_of(&allowed));
        assert!(!ScopeSet::parse("email admin").is_subset_of(&allowed));
        assert!(ScopeSet::parse("").is_subset_of(&allowed));
    }

    #[test]
    fn test_pkce_roundtrip() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = PkceChallenge::from_verifier(verifier);
        assert!(challenge.verify(verifier));
        assert!(!challenge.verify("wrong-verifier-wrong-verifier-wrong-verifier"));
    }

    #[test]
    fn test_pkce_known_vector() {
        // Appendix B of RFC 7636
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = PkceChallenge::from_verifier(verifier);
        assert_eq!(challenge.as_str(), "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn test_pkce_client_challenge_validation() {
        assert!(PkceChallenge::new("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM").is_some());
        // Too short
        assert!(PkceChallenge::new("short").is_none());
        // Invalid characters
        let bad = format!("{}+/=", "a".repeat(43));
        assert!(PkceChallenge::new(bad).is_none());
    }
}
