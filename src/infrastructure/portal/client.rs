//! Portal-backed grades source

use async_trait::async_trait;
use tracing::{debug, info_span, Instrument};

use super::auth::login;
use super::endpoints::PortalEndpoints;
use super::grades_page::fetch_grades;
use super::session::{PortalHttpSettings, SessionProvider};
use crate::config::PortalConfig;
use crate::domain::{Course, DomainError, GradesSource, StudentCredentials};

/// Runs session → login → grades fetch against the student portal
///
/// Every call starts from a new session, and the session is dropped when the
/// call returns. A successful scrape ends with a best-effort logout.
#[derive(Debug, Clone, Default)]
pub struct PortalClient {
    sessions: SessionProvider,
}

impl PortalClient {
    pub fn new(endpoints: PortalEndpoints, settings: PortalHttpSettings) -> Self {
        Self {
            sessions: SessionProvider::new(endpoints, settings),
        }
    }

    /// Client for the production portal
    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(PortalEndpoints::default(), PortalHttpSettings::from(config))
    }

    pub fn endpoints(&self) -> &PortalEndpoints {
        self.sessions.endpoints()
    }

    async fn scrape(&self, credentials: &StudentCredentials) -> Result<Vec<Course>, DomainError> {
        let session = self
            .sessions
            .acquire()
            .instrument(info_span!("portal.session"))
            .await?;

        let session = login(session, credentials)
            .instrument(info_span!("portal.login"))
            .await?;

        let courses = fetch_grades(&session)
            .instrument(info_span!("portal.grades"))
            .await?;

        session.logout().await;

        Ok(courses)
    }
}

#[async_trait]
impl GradesSource for PortalClient {
    async fn fetch_grades(&self, credentials: &StudentCredentials) -> Result<Vec<Course>, DomainError> {
        let span = info_span!("portal.scrape", student_id = %credentials.student_id());

        async {
            let result = self.scrape(credentials).await;
            if let Err(e) = &result {
                debug!(error = %e, "Portal scrape failed");
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DASHBOARD: &str = include_str!("../../../tests/fixtures/dashboard.html");
    const GRADES: &str = include_str!("../../../tests/fixtures/grades.html");
    const LOGIN_FAILED: &str = include_str!("../../../tests/fixtures/login_failed.html");

    fn client_for(server: &MockServer) -> PortalClient {
        PortalClient::new(
            PortalEndpoints::with_base_url(server.uri()),
            PortalHttpSettings::default(),
        )
    }

    async fn mount_session(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/my/"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "PHPSESSID=abc123; Path=/"),
            )
            .mount(server)
            .await;
    }

    fn credentials(password: &str) -> StudentCredentials {
        StudentCredentials::new("S1001", password).unwrap()
    }

    #[tokio::test]
    async fn test_full_scrape_logs_out_afterwards() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/my/loginAuth.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DASHBOARD))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/my/index.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GRADES))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/my/logout.php"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let courses = client_for(&server)
            .fetch_grades(&credentials("hunter2"))
            .await
            .unwrap();

        assert_eq!(
            courses.iter().map(|c| c.code.as_str()).collect::<Vec<_>>(),
            vec!["CSC301", "MTH201", "GST111"]
        );
    }

    #[tokio::test]
    async fn test_logout_failure_does_not_fail_scrape() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/my/loginAuth.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DASHBOARD))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/my/index.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GRADES))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/my/logout.php"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let courses = client_for(&server)
            .fetch_grades(&credentials("hunter2"))
            .await
            .unwrap();
        assert_eq!(courses.len(), 3);
    }

    #[tokio::test]
    async fn test_slow_logout_does_not_hold_response() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/my/loginAuth.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DASHBOARD))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/my/index.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GRADES))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/my/logout.php"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(15)))
            .mount(&server)
            .await;

        let started = Instant::now();
        let courses = client_for(&server)
            .fetch_grades(&credentials("hunter2"))
            .await
            .unwrap();

        assert_eq!(courses.len(), 3);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_rejected_login_never_requests_grades() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/my/loginAuth.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_FAILED))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/my/index.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GRADES))
            .expect(0)
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_grades(&credentials("wrong")).await;
        assert!(matches!(result, Err(DomainError::InvalidCredentials { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_session_page_never_logs_in() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/my/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/my/loginAuth.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DASHBOARD))
            .expect(0)
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_grades(&credentials("hunter2")).await;
        assert!(matches!(result, Err(DomainError::Network { .. })));
    }

    #[tokio::test]
    async fn test_each_call_starts_a_new_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/my/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/my/loginAuth.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DASHBOARD))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/my/index.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GRADES))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.fetch_grades(&credentials("hunter2")).await.unwrap();
        client.fetch_grades(&credentials("hunter2")).await.unwrap();
    }

    #[test]
    fn test_from_config_targets_production_portal() {
        let client = PortalClient::from_config(&PortalConfig::default());
        assert_eq!(client.endpoints(), &PortalEndpoints::default());
    }
}
