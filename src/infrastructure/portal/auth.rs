//! Authenticator

use reqwest::{StatusCode, Url};
use scraper::Html;
use tracing::{debug, warn};

use super::endpoints::PortalEndpoints;
use super::markers::{failure_phrase, has_login_form, has_logout_link};
use super::session::{transport_error, AuthenticatedSession, PortalSession};
use crate::domain::{DomainError, StudentCredentials};

const USERNAME_FIELD: &str = "username";
const PASSWORD_FIELD: &str = "password";

/// How the portal answered a login form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    Rejected(String),
    Unrecognized,
}

/// Classifies a login response from its final URL and markup
///
/// The portal answers 200 whether or not the password was right, so the
/// status code carries no signal here. A login form, a failure phrase, or a
/// bounce to the session page without a logout link is a rejection. A page
/// with none of these and no logout link is unrecognized.
pub fn classify_login(final_url: &Url, body: &str) -> Result<LoginOutcome, DomainError> {
    let document = Html::parse_document(body);

    let logged_in = has_logout_link(&document)?;

    let rejection = if has_login_form(&document)? {
        Some("login form shown again".to_string())
    } else if let Some(phrase) = failure_phrase(&document) {
        Some(format!("portal reported '{}'", phrase))
    } else if !logged_in && PortalEndpoints::is_session_page(final_url) {
        Some("redirected back to login page".to_string())
    } else {
        None
    };

    Ok(match rejection {
        Some(reason) => LoginOutcome::Rejected(reason),
        None if logged_in => LoginOutcome::Accepted,
        None => LoginOutcome::Unrecognized,
    })
}

/// Submits the credentials through the session and upgrades it on success
///
/// The session is consumed either way: a rejected session is dropped here
/// with its cookie jar.
pub async fn login(
    session: PortalSession,
    credentials: &StudentCredentials,
) -> Result<AuthenticatedSession, DomainError> {
    let url = session.endpoints().login_url();
    let form = [
        (USERNAME_FIELD, credentials.student_id()),
        (PASSWORD_FIELD, credentials.password()),
    ];

    let response = session
        .client()
        .post(&url)
        .form(&form)
        .send()
        .await
        .map_err(|e| transport_error("login", e))?;

    let status = response.status();
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(DomainError::invalid_credentials(format!(
            "Login returned HTTP {}",
            status
        )));
    }
    if !status.is_success() {
        return Err(DomainError::network(format!("Login returned HTTP {}", status)));
    }

    let final_url = response.url().clone();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error("login", e))?;

    match classify_login(&final_url, &body)? {
        LoginOutcome::Accepted => {
            debug!("Portal accepted credentials");
            Ok(AuthenticatedSession::new(session))
        }
        LoginOutcome::Rejected(reason) => {
            debug!(%reason, "Portal rejected credentials");
            Err(DomainError::invalid_credentials(reason))
        }
        LoginOutcome::Unrecognized => {
            warn!(final_url = %final_url.path(), "Login response matched no known marker");
            Err(DomainError::protocol_changed(
                "Login response has neither a logout link nor a failure marker",
            ))
        }
    }
}
