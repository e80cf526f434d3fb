//! Student credential validation

use std::fmt;

use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur during credential validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialsValidationError {
    #[error("studentId is required")]
    EmptyStudentId,

    #[error("studentId exceeds maximum length of {0} characters")]
    StudentIdTooLong(usize),

    #[error("studentId contains invalid character: '{0}'")]
    InvalidStudentIdCharacter(char),

    #[error("password is required")]
    EmptyPassword,

    #[error("password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

impl From<CredentialsValidationError> for DomainError {
    fn from(err: CredentialsValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

const MAX_STUDENT_ID_LENGTH: usize = 64;
const MAX_PASSWORD_LENGTH: usize = 256;

/// Validate a student ID / password pair
///
/// Rules:
/// - studentId cannot be empty (after trimming) and is at most 64 characters
/// - studentId contains no whitespace or ':' (it is embedded in cache keys)
/// - password cannot be empty and is at most 256 characters
pub fn validate_credentials(student_id: &str, password: &str) -> Result<(), CredentialsValidationError> {
    let student_id = student_id.trim();

    if student_id.is_empty() {
        return Err(CredentialsValidationError::EmptyStudentId);
    }

    if student_id.chars().count() > MAX_STUDENT_ID_LENGTH {
        return Err(CredentialsValidationError::StudentIdTooLong(MAX_STUDENT_ID_LENGTH));
    }

    if let Some(c) = student_id.chars().find(|c| c.is_whitespace() || *c == ':') {
        return Err(CredentialsValidationError::InvalidStudentIdCharacter(c));
    }

    if password.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(CredentialsValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Validated login credentials for the portal
///
/// `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct StudentCredentials {
    student_id: String,
    password: String,
}

impl StudentCredentials {
    pub fn new(
        student_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsValidationError> {
        let student_id = student_id.into();
        let password = password.into();

        validate_credentials(&student_id, &password)?;

        Ok(Self {
            student_id: student_id.trim().to_string(),
            password,
        })
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for StudentCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentCredentials")
            .field("student_id", &self.student_id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_credentials() {
        let creds = StudentCredentials::new("  S1001 ", "correct").unwrap();
        assert_eq!(creds.student_id(), "S1001");
        assert_eq!(creds.password(), "correct");
    }

    #[test]
    fn test_empty_student_id() {
        assert_eq!(
            validate_credentials("   ", "pw"),
            Err(CredentialsValidationError::EmptyStudentId)
        );
    }

    #[test]
    fn test_empty_password() {
        assert_eq!(
            validate_credentials("S1001", ""),
            Err(CredentialsValidationError::EmptyPassword)
        );
    }

    #[test]
    fn test_student_id_rejects_key_separator() {
        assert_eq!(
            validate_credentials("S1:001", "pw"),
            Err(CredentialsValidationError::InvalidStudentIdCharacter(':'))
        );
        assert_eq!(
            validate_credentials("S1 001", "pw"),
            Err(CredentialsValidationError::InvalidStudentIdCharacter(' '))
        );
    }

    #[test]
    fn test_length_limits() {
        let long_id = "S".repeat(65);
        assert_eq!(
            validate_credentials(&long_id, "pw"),
            Err(CredentialsValidationError::StudentIdTooLong(64))
        );

        let long_password = "p".repeat(257);
        assert_eq!(
            validate_credentials("S1001", &long_password),
            Err(CredentialsValidationError::PasswordTooLong(256))
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = StudentCredentials::new("S1001", "hunter2").unwrap();
        let debug = format!("{:?}", creds);

        assert!(debug.contains("S1001"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_converts_to_validation_error() {
        let err: DomainError = CredentialsValidationError::EmptyPassword.into();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(err.to_string(), "Validation error: password is required");
    }
}
