//! Password hashing and verification using bcrypt
//!
//! The cost factor is fixed for the whole deployment. Hashes are salted, so the
//! same plaintext never produces the same hash twice.

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::warn;

pub const PASSWORD_HASH_COST: u32 = DEFAULT_COST;

/// Hash a plaintext password
pub fn hash_password(plaintext: &str) -> Result<String> {
    hash(plaintext, PASSWORD_HASH_COST).context("Failed to hash password")
}

/// Verify a plaintext password against a stored hash.
///
/// Returns false on mismatch, and also when the stored hash is not a
/// well-formed bcrypt string.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    match verify(plaintext, hash) {
        Ok(valid) => valid,
        Err(e) => {
            warn!("Rejecting password check against malformed hash: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$2"));
        assert!(verify_password(password, &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_different_salts() {
        let hash1 = hash_password("same-password").unwrap();
        let hash2 = hash_password("same-password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("same-password", &hash1));
        assert!(verify_password("same-password", &hash2));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        assert!(!verify_password("password", "not-a-valid-hash"));
        assert!(!verify_password("password", ""));
    }
}
