//! Infrastructure services

mod fingerprint;
mod grades_service;

pub use fingerprint::{Argon2Fingerprint, CredentialFingerprint};
pub use grades_service::{GradesService, GradesServiceConfig};

#[cfg(test)]
pub(crate) use fingerprint::mock;
