//! Grades domain - course records and student credentials

mod course;
mod credentials;
mod summary;

pub use course::Course;
pub use credentials::{validate_credentials, CredentialsValidationError, StudentCredentials};
pub use summary::{grade_point, GradeSummary};
