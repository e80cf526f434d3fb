//! Domain layer - Core business logic and entities

pub mod cache;
pub mod error;
pub mod grades;
pub mod portal;

pub use cache::{Cache, CacheExt, CacheKeyGenerator, GradesCacheKey, MonthlyKeyGenerator};
pub use error::DomainError;
pub use grades::{
    validate_credentials, Course, CredentialsValidationError, GradeSummary, StudentCredentials,
};
pub use portal::GradesSource;
