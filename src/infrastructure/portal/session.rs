//! Session provider

use std::time::Duration;

use tracing::debug;

use super::endpoints::PortalEndpoints;
use crate::config::PortalConfig;
use crate::domain::DomainError;

/// Upper bound on the best-effort logout call
const LOGOUT_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client settings applied to every new session
#[derive(Debug, Clone)]
pub struct PortalHttpSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for PortalHttpSettings {
    fn default() -> Self {
        Self::from(&PortalConfig::default())
    }
}

impl From<&PortalConfig> for PortalHttpSettings {
    fn from(config: &PortalConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            connect_timeout: config.connect_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// A cookie-bearing client context with no credentials attached yet
///
/// Each session owns its own cookie jar; dropping it discards the portal
/// session token.
#[derive(Debug)]
pub struct PortalSession {
    client: reqwest::Client,
    endpoints: PortalEndpoints,
}

impl PortalSession {
    pub(super) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn endpoints(&self) -> &PortalEndpoints {
        &self.endpoints
    }
}

/// A session whose cookie jar holds a token the portal accepted
///
/// Only the authenticator can build one, so the scraper cannot be handed a
/// session whose login failed.
#[derive(Debug)]
pub struct AuthenticatedSession {
    session: PortalSession,
}

impl AuthenticatedSession {
    pub(super) fn new(session: PortalSession) -> Self {
        Self { session }
    }

    pub(super) fn client(&self) -> &reqwest::Client {
        self.session.client()
    }

    pub fn endpoints(&self) -> &PortalEndpoints {
        self.session.endpoints()
    }

    /// Ends the portal session. Failures and slow answers are ignored.
    pub async fn logout(self) {
        let url = self.endpoints().logout_url();
        let request = self.client().get(&url).timeout(LOGOUT_TIMEOUT).send();

        match tokio::time::timeout(LOGOUT_TIMEOUT, request).await {
            Ok(Ok(response)) => debug!(status = %response.status(), "Portal logout completed"),
            Ok(Err(e)) => debug!(error = %e, "Portal logout failed, ignoring"),
            Err(_) => debug!("Portal logout timed out, ignoring"),
        }
    }
}

/// Issues fresh sessions against the portal
#[derive(Debug, Clone, Default)]
pub struct SessionProvider {
    endpoints: PortalEndpoints,
    settings: PortalHttpSettings,
}

impl SessionProvider {
    pub fn new(endpoints: PortalEndpoints, settings: PortalHttpSettings) -> Self {
        Self { endpoints, settings }
    }

    pub fn endpoints(&self) -> &PortalEndpoints {
        &self.endpoints
    }

    /// Builds a new client with an empty cookie jar and visits the session
    /// page so the portal issues its session cookie
    pub async fn acquire(&self) -> Result<PortalSession, DomainError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.settings.request_timeout)
            .connect_timeout(self.settings.connect_timeout)
            .user_agent(self.settings.user_agent.as_str())
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {}", e)))?;

        let url = self.endpoints.session_url();
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error("session", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::network(format!(
                "Session page returned HTTP {}",
                status
            )));
        }

        debug!(%status, "Portal session acquired");

        Ok(PortalSession {
            client,
            endpoints: self.endpoints.clone(),
        })
    }
}

/// Maps a reqwest failure at one pipeline stage to a network error
pub(super) fn transport_error(stage: &str, error: reqwest::Error) -> DomainError {
    let error = error.without_url();

    if error.is_timeout() {
        DomainError::network(format!("Portal {} request timed out", stage))
    } else if error.is_connect() {
        DomainError::network(format!("Could not connect to portal for {}: {}", stage, error))
    } else {
        DomainError::network(format!("Portal {} request failed: {}", stage, error))
    }
}
