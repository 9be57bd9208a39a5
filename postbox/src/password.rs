//! Password hashing and verification using Argon2id

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

use crate::error::{ApiError, ApiResult};

/// Hash a password using Argon2id, returning the PHC string stored on the user.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(rand::thread_rng());

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

/// Check a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();

        assert_ne!(hash, "hunter2");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &hash));
    }

    #[test]
    fn test_wrong_password() {
        let hash = hash_password("hunter2").unwrap();
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("hunter2", "plaintext"));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }
}
