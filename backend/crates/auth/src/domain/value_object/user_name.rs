//! User Name Value Object
//!
//! The user name is the public handle used for login, display and
//! lookups. Input keeps its casing for display; uniqueness and lookups
//! go through the canonical (NFKC-normalized, lowercased) form.
//!
//! Invariants (checked after NFKC normalization):
//! - 3..=30 characters
//! - ASCII letters, digits and `_ . - +` only
//! - first and last character alphanumeric or `_`
//! - no consecutive dots (`..`)
//! - at least one alphanumeric character
//! - not a reserved word (routing/system vocabulary)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 30;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-', '+'];

/// Reserved words that cannot be used as user names
const RESERVED_WORDS: &[&str] = &[
    // System/Admin
    "admin", "administrator", "root", "system", "superuser", "moderator",
    "staff", "support", "help",
    // API/Routing
    "api", "oauth", "auth", "login", "logout", "signin", "signout",
    "signup", "register", "password", "reset", "token", "verify",
    "callback", "webhook",
    // Resources
    "user", "users", "account", "accounts", "profile", "settings",
    "sessions", "dashboard", "home", "index",
    // Common reserved
    "www", "mail", "email", "test", "demo", "example", "null",
    "undefined", "anonymous", "guest",
    // Special
    "me", "self", "new", "edit", "delete", "create", "update", "search",
];

/// User name validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("User name must be at least {USER_NAME_MIN_LENGTH} characters")]
    TooShort,

    #[error("User name must be at most {USER_NAME_MAX_LENGTH} characters")]
    TooLong,

    #[error("User name contains invalid characters")]
    InvalidCharacter,

    #[error("User name must start and end with a letter, digit or underscore")]
    InvalidBoundary,

    #[error("User name cannot contain consecutive dots")]
    ConsecutiveDots,

    #[error("User name must contain at least one letter or digit")]
    NoAlphanumeric,

    #[error("User name is reserved")]
    Reserved,
}

/// Validated user name
///
/// Keeps both the display form (as entered) and the canonical form
/// (lowercase) used for uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Create a new user name with validation
    ///
    /// Normalization order: NFKC → validate → lowercase canonical.
    pub fn new(input: impl Into<String>) -> Result<Self, UserNameError> {
        let normalized: String = input.into().trim().nfkc().collect();

        let char_count = normalized.chars().count();
        if char_count < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort);
        }
        if char_count > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong);
        }

        for ch in normalized.chars() {
            if !ch.is_ascii_alphanumeric() && !ALLOWED_SPECIAL_CHARS.contains(&ch) {
                return Err(UserNameError::InvalidCharacter);
            }
        }

        let first = normalized.chars().next().unwrap_or(' ');
        let last = normalized.chars().last().unwrap_or(' ');
        if !Self::is_boundary_char(first) || !Self::is_boundary_char(last) {
            return Err(UserNameError::InvalidBoundary);
        }

        if normalized.contains("..") {
            return Err(UserNameError::ConsecutiveDots);
        }

        if !normalized.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(UserNameError::NoAlphanumeric);
        }

        let canonical = normalized.to_ascii_lowercase();

        if RESERVED_WORDS.contains(&canonical.as_str()) {
            return Err(UserNameError::Reserved);
        }

        Ok(Self {
            original: normalized,
            canonical,
        })
    }

    fn is_boundary_char(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_'
    }

    /// Restore from a database value (already validated at write time)
    pub fn from_db(original: &str) -> Result<Self, UserNameError> {
        Ok(Self {
            original: original.to_string(),
            canonical: original.to_ascii_lowercase(),
        })
    }

    /// The display form, as the user entered it
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The canonical form used for uniqueness and lookups
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The display form as a string slice
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["alice", "bob_42", "a.b-c", "Name+Tag", "x_y"] {
            assert!(UserName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_canonical_lowercase() {
        let name = UserName::new("AliceWonder").unwrap();
        assert_eq!(name.original(), "AliceWonder");
        assert_eq!(name.canonical(), "alicewonder");
    }

    #[test]
    fn test_length_limits() {
        assert_eq!(UserName::new("ab"), Err(UserNameError::TooShort));
        let long = "a".repeat(USER_NAME_MAX_LENGTH + 1);
        assert_eq!(UserName::new(long), Err(UserNameError::TooLong));
        let max = "a".repeat(USER_NAME_MAX_LENGTH);
        assert!(UserName::new(max).is_ok());
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(UserName::new("ali ce"), Err(UserNameError::InvalidCharacter));
        assert_eq!(UserName::new("ali@ce"), Err(UserNameError::InvalidCharacter));
        assert_eq!(UserName::new("日本語名前"), Err(UserNameError::InvalidCharacter));
    }

    #[test]
    fn test_boundary_rules() {
        assert_eq!(UserName::new(".alice"), Err(UserNameError::InvalidBoundary));
        assert_eq!(UserName::new("alice-"), Err(UserNameError::InvalidBoundary));
        assert!(UserName::new("_alice_").is_ok());
    }

    #[test]
    fn test_consecutive_dots() {
        assert_eq!(UserName::new("a..b"), Err(UserNameError::ConsecutiveDots));
        assert!(UserName::new("a.b.c").is_ok());
    }

    #[test]
    fn test_reserved_words() {
        assert_eq!(UserName::new("admin"), Err(UserNameError::Reserved));
        assert_eq!(UserName::new("ADMIN"), Err(UserNameError::Reserved));
        assert_eq!(UserName::new("oauth"), Err(UserNameError::Reserved));
        assert!(UserName::new("admin2").is_ok());
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth latin input normalizes to plain ASCII
        let name = UserName::new("ａｂｃ").unwrap();
        assert_eq!(name.canonical(), "abc");
    }

    #[test]
    fn test_from_db_roundtrip() {
        let name = UserName::new("Carol.B").unwrap();
        let restored = UserName::from_db(name.original()).unwrap();
        assert_eq!(restored, name);
    }
}
