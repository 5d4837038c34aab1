//! Password Hashing
//! Mission: One-way adaptive credential hashing with bcrypt

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Salted, cost-adaptive password hasher.
///
/// The salt is embedded in the hash string, so the same plaintext yields a
/// different hash on every call. Verification never errors on a simple
/// mismatch; it returns `Ok(false)`.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    /// Lower costs are only appropriate for tests.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String> {
        hash(plaintext, self.cost).context("Failed to hash password")
    }

    pub fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool> {
        verify(plaintext, hashed).context("Failed to verify password")
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        // MIN_COST keeps the test suite quick
        PasswordHasher::with_cost(bcrypt::MIN_COST)
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hasher = fast_hasher();
        let hashed = hasher.hash("password1").unwrap();

        assert!(hasher.verify("password1", &hashed).unwrap());
        assert!(!hasher.verify("password2", &hashed).unwrap());
    }

    #[test]
    fn test_same_input_different_hashes() {
        let hasher = fast_hasher();
        let first = hasher.hash("password1").unwrap();
        let second = hasher.hash("password1").unwrap();

        // Random salt per call
        assert_ne!(first, second);
        assert!(hasher.verify("password1", &first).unwrap());
        assert!(hasher.verify("password1", &second).unwrap());
    }

    #[test]
    fn test_mismatch_is_false_not_error() {
        let hasher = fast_hasher();
        let hashed = hasher.hash("correct horse").unwrap();

        let result = hasher.verify("battery staple", &hashed);
        assert!(matches!(result, Ok(false)));
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let hasher = fast_hasher();
        assert!(hasher.verify("anything", "not-a-bcrypt-hash").is_err());
    }
}
