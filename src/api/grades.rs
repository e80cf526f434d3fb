//! Grades endpoint handlers

use axum::extract::State;
use tracing::{debug, error, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, GradesRequest, GradesSummaryResponse, GreetingResponse, Json};
use crate::domain::{Course, DomainError};

/// GET /
pub async fn greeting() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: format!("nile-cgpa {} is running", env!("CARGO_PKG_VERSION")),
    })
}

/// POST /cgpa
pub async fn get_grades(
    State(state): State<AppState>,
    Json(request): Json<GradesRequest>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = fetch_courses(&state, request).await?;
    Ok(Json(courses))
}

/// POST /cgpa/summary
pub async fn get_grades_summary(
    State(state): State<AppState>,
    Json(request): Json<GradesRequest>,
) -> Result<Json<GradesSummaryResponse>, ApiError> {
    let courses = fetch_courses(&state, request).await?;
    Ok(Json(GradesSummaryResponse::from(courses)))
}

async fn fetch_courses(state: &AppState, request: GradesRequest) -> Result<Vec<Course>, ApiError> {
    let credentials = request.into_credentials()?;
    debug!(student_id = %credentials.student_id(), "Fetching grades");

    state
        .grades_service
        .fetch(&credentials)
        .await
        .map_err(|e| {
            log_failure(credentials.student_id(), &e);
            ApiError::from(e)
        })
}

/// Detail stays in the logs; the response only carries the generic message
fn log_failure(student_id: &str, error: &DomainError) {
    if error.is_auth_failure() {
        info!(student_id = %student_id, error = %error, "Grades request rejected");
    } else {
        error!(student_id = %student_id, error = %error, "Grades request failed");
    }
}
