use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hash checked when the username is unknown, so a miss costs the same as a wrong password
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| PasswordService::new().hash("mdm-dummy-password").ok());

/// Argon2 salted hashing and constant-time verification
#[derive(Debug, Default, Clone, Copy)]
pub struct PasswordService;

impl PasswordService {
    pub fn new() -> Self {
        Self
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Build the dummy hash now so no login request pays for it
    pub fn prepare(&self) {
        Lazy::force(&DUMMY_HASH);
    }

    /// Burn one verification's worth of work; always reports a mismatch
    pub fn verify_dummy(&self, password: &str) -> bool {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = self.verify(password, hash);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_builds_dummy_hash() {
        PasswordService::new().prepare();
        assert!(matches!(Lazy::get(&DUMMY_HASH), Some(Some(_))));
    }

    #[test]
    fn test_hash_is_salted_phc_string() {
        let service = PasswordService::new();
        let hash1 = service.hash("same-password").unwrap();
        let hash2 = service.hash("same-password").unwrap();

        assert!(hash1.starts_with("$argon2"));
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_correct_and_incorrect() {
        let service = PasswordService::new();
        let hash = service.hash("correct-password").unwrap();

        assert!(service.verify("correct-password", &hash).unwrap());
        assert!(!service.verify("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_verify_malformed_hash() {
        let service = PasswordService::new();
        assert!(matches!(
            service.verify("any-password", "plaintext"),
            Err(PasswordError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_dummy_never_matches() {
        assert!(!PasswordService::new().verify_dummy("mdm-dummy-password"));
    }
}
