//! Password fingerprints for cached grades using Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Proves that a later request knows the password that produced a cache entry
pub trait CredentialFingerprint: Send + Sync + Debug {
    /// Salted one-way digest of the password
    fn fingerprint(&self, password: &str) -> Result<String, DomainError>;

    /// Whether the password matches a stored fingerprint
    fn matches(&self, password: &str, fingerprint: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct Argon2Fingerprint;

impl Argon2Fingerprint {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialFingerprint for Argon2Fingerprint {
    fn fingerprint(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to fingerprint password: {}", e)))
    }

    fn matches(&self, password: &str, fingerprint: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(fingerprint) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
