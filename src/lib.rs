//! nile-cgpa
//!
//! Fetches a student's course grades from the Nile University student portal
//! and serves them over HTTP, with a per-month cache in front of the scrape:
//! - `infrastructure::portal` logs in and parses the grades page
//! - `infrastructure::services::GradesService` owns the monthly cache
//! - `api` exposes `POST /cgpa` and `POST /cgpa/summary`

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use infrastructure::cache::CacheBackend;
use infrastructure::portal::PortalClient;
use infrastructure::services::{GradesService, GradesServiceConfig};

/// Wire the cache backend, portal client and grades service
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let backend = CacheBackend::try_from(&config.cache)?;
    info!(%backend, "Creating grades cache");

    let cache = backend.connect().await?;
    let portal = Arc::new(PortalClient::from_config(&config.portal));

    let service = GradesService::with_config(
        cache.clone(),
        portal,
        GradesServiceConfig::from(&config.cache),
    );

    if !service.config().verify_credentials {
        info!("Cached grades are served without checking the password");
    }

    Ok(AppState::new(Arc::new(service), cache))
}
