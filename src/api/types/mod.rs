//! API request and response types

pub mod error;
pub mod grades;
pub mod json;

pub use error::{ApiError, ApiErrorResponse};
pub use grades::{GradesRequest, GradesSummaryResponse, GreetingResponse};
pub use json::Json;
