//! Backup Code Entity
//!
//! Single-use recovery codes accepted in place of a TOTP code. The
//! plain codes are shown to the user exactly once; only SHA-256 hashes
//! are stored. A regeneration replaces the whole batch.

use chrono::{DateTime, Utc};
use platform::crypto::{hash_token, random_bytes};

use crate::domain::value_object::user_id::UserId;

/// Number of codes in a batch
pub const BACKUP_CODE_COUNT: usize = 10;

/// Length of a code in characters (excluding the display dash)
pub const BACKUP_CODE_LENGTH: usize = 8;

/// Alphabet for backup codes: lowercase base32 without ambiguous chars
const CODE_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

/// A single stored backup code
#[derive(Debug, Clone)]
pub struct BackupCode {
    /// Owning user
    pub user_id: UserId,
    /// SHA-256 hash of the normalized code
    pub code_hash: Vec<u8>,
    /// Set when the code was consumed
    pub used_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// A freshly generated batch with the plain codes still present
#[derive(Debug)]
pub struct GeneratedBackupCodes {
    /// Plain codes for one-time display, formatted `xxxx-xxxx`
    pub plain_codes: Vec<String>,
    /// Stored rows (hashes only)
    pub codes: Vec<BackupCode>,
}

/// Generate a fresh batch of backup codes for a user
pub fn generate_backup_codes(user_id: &UserId) -> GeneratedBackupCodes {
    let now = Utc::now();
    let mut plain_codes = Vec::with_capacity(BACKUP_CODE_COUNT);
    let mut codes = Vec::with_capacity(BACKUP_CODE_COUNT);

    for _ in 0..BACKUP_CODE_COUNT {
        let raw = random_code();
        codes.push(BackupCode {
            user_id: user_id.clone(),
            code_hash: hash_token(&raw).to_vec(),
            used_at: None,
            created_at: now,
        });
        plain_codes.push(format_code(&raw));
    }

    GeneratedBackupCodes { plain_codes, codes }
}

/// Normalize user input before hashing: lowercase, dashes and spaces removed
pub fn normalize_code(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect::<String>()
        .to_lowercase()
}

/// Hash a user-entered code for lookup
pub fn hash_code(input: &str) -> Vec<u8> {
    hash_token(&normalize_code(input)).to_vec()
}

fn random_code() -> String {
    random_bytes(BACKUP_CODE_LENGTH)
        .into_iter()
        .map(|b| CODE_ALPHABET[b as usize % CODE_ALPHABET.len()] as char)
        .collect()
}

fn format_code(raw: &str) -> String {
    let (head, tail) = raw.split_at(BACKUP_CODE_LENGTH / 2);
    format!("{}-{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_batch_size() {
        let generated = generate_backup_codes(&UserId::new());
        assert_eq!(generated.plain_codes.len(), BACKUP_CODE_COUNT);
        assert_eq!(generated.codes.len(), BACKUP_CODE_COUNT);
    }

    #[test]
    fn test_codes_are_unique() {
        let generated = generate_backup_codes(&UserId::new());
        let mut hashes: Vec<_> = generated.codes.iter().map(|c| c.code_hash.clone()).collect();
        hashes.sort();
        hashes.dedup();
        assert_eq!(hashes.len(), BACKUP_CODE_COUNT);
    }

    #[test]
    fn test_plain_code_matches_hash() {
        let generated = generate_backup_codes(&UserId::new());
        for (plain, stored) in generated.plain_codes.iter().zip(&generated.codes) {
            assert_eq!(&hash_code(plain), &stored.code_hash);
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("ABCD-EFGH"), "abcdefgh");
        assert_eq!(normalize_code("ab cd ef gh"), "abcdefgh");
    }

    #[test]
    fn test_display_format() {
        let generated = generate_backup_codes(&UserId::new());
        for plain in &generated.plain_codes {
            assert_eq!(plain.len(), BACKUP_CODE_LENGTH + 1);
            assert_eq!(plain.chars().filter(|&c| c == '-').count(), 1);
        }
    }
}
