//! Request and response bodies for the grades endpoints

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::domain::{Course, CredentialsValidationError, GradeSummary, StudentCredentials};

/// Body of `POST /cgpa` and `POST /cgpa/summary`
///
/// Both fields are optional at the serde level so that a missing field is
/// reported with the same message as an empty one.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradesRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for GradesRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradesRequest")
            .field("student_id", &self.student_id)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GradesRequest {
    pub fn new(student_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            student_id: Some(student_id.into()),
            password: Some(password.into()),
        }
    }

    /// Validates the body before anything touches the network
    pub fn into_credentials(self) -> Result<StudentCredentials, ApiError> {
        let student_id = self.student_id.unwrap_or_default();
        let password = self.password.unwrap_or_default();

        StudentCredentials::new(student_id, password).map_err(|e| {
            let param = match e {
                CredentialsValidationError::EmptyPassword
                | CredentialsValidationError::PasswordTooLong(_) => "password",
                _ => "studentId",
            };
            ApiError::bad_request(e.to_string()).with_param(param)
        })
    }
}

/// Body of `POST /cgpa/summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradesSummaryResponse {
    pub courses: Vec<Course>,
    pub summary: GradeSummary,
}

impl From<Vec<Course>> for GradesSummaryResponse {
    fn from(courses: Vec<Course>) -> Self {
        let summary = GradeSummary::from_courses(&courses);
        Self { courses, summary }
    }
}

/// Body of `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetingResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: GradesRequest =
            serde_json::from_str(r#"{"studentId":"S1001","password":"correct"}"#).unwrap();

        let credentials = request.into_credentials().unwrap();
        assert_eq!(credentials.student_id(), "S1001");
        assert_eq!(credentials.password(), "correct");
    }

    #[test]
    fn test_missing_password_is_bad_request() {
        let request: GradesRequest = serde_json::from_str(r#"{"studentId":"S1001"}"#).unwrap();

        let err = request.into_credentials().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.message, "password is required");
        assert_eq!(err.response.error.param.as_deref(), Some("password"));
    }

    #[test]
    fn test_blank_student_id_is_bad_request() {
        let err = GradesRequest::new("   ", "correct").into_credentials().unwrap_err();

        assert_eq!(err.response.error.message, "studentId is required");
        assert_eq!(err.response.error.param.as_deref(), Some("studentId"));
    }

    #[test]
    fn test_null_fields_are_bad_request() {
        let request: GradesRequest =
            serde_json::from_str(r#"{"studentId":null,"password":null}"#).unwrap();

        assert!(request.into_credentials().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", GradesRequest::new("S1001", "hunter2"));

        assert!(debug.contains("S1001"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_summary_response_from_courses() {
        let response = GradesSummaryResponse::from(vec![
            Course::new("CSC301", "Algorithms", 3).with_grade("A"),
            Course::new("MTH201", "Linear Algebra", 3).with_grade("C"),
        ]);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["courses"][0]["code"], "CSC301");
        assert_eq!(json["summary"]["cgpa"], 4.0);
        assert_eq!(json["summary"]["totalCreditUnits"], 6);
    }
}
