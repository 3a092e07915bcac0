//! Password hashing using argon2
//!
//! Argon2id hashes in PHC string format. Verification runs argon2's
//! constant-time comparison. Both operations are CPU-heavy; async callers
//! use the `*_async` variants, which run on the blocking pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use tracing::warn;

/// Stand-in hash verified when an account has no usable password, so
/// sign-in costs one Argon2 verify whether or not the account exists.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| PasswordService::hash("admin-panel-unmatched-password").unwrap_or_default());

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password (blocking)
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Check a password against a stored hash (blocking)
    ///
    /// A stored value that is not a PHC hash never matches.
    pub fn verify(password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Check a password on the blocking thread pool
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }

    /// Spend the same work as [`verify_async`](Self::verify_async) for an
    /// account that has no stored hash. Never matches.
    pub async fn verify_unmatched_async(password: String) -> Result<bool> {
        Self::verify_async(password, Self::dummy_hash().to_string()).await?;
        Ok(false)
    }

    pub(crate) fn dummy_hash() -> &'static str {
        DUMMY_HASH.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hash = PasswordService::hash(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordService::verify(password, &hash));
        assert!(!PasswordService::verify("wrong_password", &hash));
    }

    #[test]
    fn test_salted_hashes_differ() {
        let hash1 = PasswordService::hash("test_password").unwrap();
        let hash2 = PasswordService::hash("test_password").unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!PasswordService::verify("anything", "not-a-phc-string"));
        assert!(!PasswordService::verify("", ""));
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let password = "async_test_password".to_string();
        let hash = PasswordService::hash_async(password.clone()).await.unwrap();

        assert!(PasswordService::verify_async(password, hash.clone()).await.unwrap());
        assert!(!PasswordService::verify_async("wrong".to_string(), hash).await.unwrap());
    }

    #[test]
    fn test_dummy_hash_is_real_argon2() {
        let hash = PasswordService::dummy_hash();

        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordHash::new(hash).is_ok());
    }

    #[tokio::test]
    async fn test_unmatched_verify_never_matches() {
        for password in ["", "admin-panel-unmatched", "correct horse battery"] {
            assert!(!PasswordService::verify_unmatched_async(password.to_string())
                .await
                .unwrap());
        }
    }
}
