use thiserror::Error;

/// Core domain errors
///
/// The first five variants are the pipeline classifications a request can
/// terminate with. `Cache` never reaches a caller of the grades service.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Parse failure: {message}")]
    ParseFailure { message: String },

    #[error("Portal protocol changed: {message}")]
    ProtocolChanged { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self::ParseFailure {
            message: message.into(),
        }
    }

    pub fn protocol_changed(message: impl Into<String>) -> Self {
        Self::ProtocolChanged {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error means the portal refused the student's identity
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. } | Self::Unauthorized { .. }
        )
    }
}
