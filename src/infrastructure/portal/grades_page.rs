//! Grades page fetch

use reqwest::StatusCode;
use scraper::Html;
use tracing::debug;

use super::endpoints::PortalEndpoints;
use super::markers::has_login_form;
use super::parser::parse_grades;
use super::session::{transport_error, AuthenticatedSession};
use crate::domain::{Course, DomainError};

/// Downloads the grades page through an authenticated session and parses it
///
/// A response that lands anywhere but the grades page, or that shows a login
/// form, means the portal dropped the session. That is reported as
/// `Unauthorized` without attempting to parse.
pub async fn fetch_grades(session: &AuthenticatedSession) -> Result<Vec<Course>, DomainError> {
    let url = session.endpoints().grades_url();

    let response = session
        .client()
        .get(&url)
        .send()
        .await
        .map_err(|e| transport_error("grades", e))?;

    let status = response.status();
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(DomainError::unauthorized(format!(
            "Grades page returned HTTP {}",
            status
        )));
    }
    if !status.is_success() {
        return Err(DomainError::network(format!(
            "Grades page returned HTTP {}",
            status
        )));
    }

    if !PortalEndpoints::is_grades_page(response.url()) {
        return Err(DomainError::unauthorized(format!(
            "Grades request redirected to {}",
            response.url().path()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| transport_error("grades", e))?;

    if has_login_form(&Html::parse_document(&body))? {
        return Err(DomainError::unauthorized("Grades page shows a login form"));
    }

    let courses = parse_grades(&body)?;
    debug!(courses = courses.len(), "Parsed grades page");

    Ok(courses)
}
