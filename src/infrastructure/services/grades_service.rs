//! Monthly grades cache in front of the portal scrape

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, info_span, warn, Instrument};

use super::fingerprint::{Argon2Fingerprint, CredentialFingerprint};
use crate::config::CacheSettings;
use crate::domain::cache::{Cache, CacheExt, CacheKeyGenerator, GradesCacheKey, MonthlyKeyGenerator};
use crate::domain::{Course, DomainError, GradesSource, StudentCredentials};

/// Configuration for the grades cache front-end
#[derive(Debug, Clone)]
pub struct GradesServiceConfig {
    /// Namespace prefix for cache keys
    pub namespace: String,
    /// Lifetime of a written entry, independent of the month in the key
    pub ttl: Duration,
    /// Upper bound on a single cache read or write
    pub operation_timeout: Duration,
    /// Serve hits only to requests whose password matches the stored fingerprint
    pub verify_credentials: bool,
}

impl Default for GradesServiceConfig {
    fn default() -> Self {
        Self {
            namespace: "cgpa".to_string(),
            ttl: Duration::from_secs(24 * 60 * 60),
            operation_timeout: Duration::from_secs(2),
            verify_credentials: true,
        }
    }
}

impl From<&CacheSettings> for GradesServiceConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            operation_timeout: settings.operation_timeout(),
            verify_credentials: settings.verify_credentials,
            ..Default::default()
        }
    }
}

/// Store keys for one student-month
#[derive(Debug)]
struct EntryKeys {
    courses: String,
    fingerprint: String,
}

/// Serves a student's courses from the monthly cache, scraping the portal
/// on a miss
///
/// Cache failures never reach the caller: a failed read is a miss and a
/// failed write is logged. Concurrent misses for the same key share one
/// scrape.
#[derive(Debug)]
pub struct GradesService {
    cache: Arc<dyn Cache>,
    source: Arc<dyn GradesSource>,
    fingerprints: Arc<dyn CredentialFingerprint>,
    config: GradesServiceConfig,
    course_keys: MonthlyKeyGenerator,
    fingerprint_keys: MonthlyKeyGenerator,
    in_flight: Mutex<HashMap<String, Weak<tokio::sync::Mutex<()>>>>,
}

impl GradesService {
    pub fn new(cache: Arc<dyn Cache>, source: Arc<dyn GradesSource>) -> Self {
        Self::with_config(cache, source, GradesServiceConfig::default())
    }

    pub fn with_config(
        cache: Arc<dyn Cache>,
        source: Arc<dyn GradesSource>,
        config: GradesServiceConfig,
    ) -> Self {
        Self {
            cache,
            source,
            fingerprints: Arc::new(Argon2Fingerprint::new()),
            config,
            course_keys: MonthlyKeyGenerator::new(),
            fingerprint_keys: MonthlyKeyGenerator::new().with_scope("auth"),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the password fingerprint scheme
    pub fn with_fingerprint(mut self, fingerprints: Arc<dyn CredentialFingerprint>) -> Self {
        self.fingerprints = fingerprints;
        self
    }

    pub fn config(&self) -> &GradesServiceConfig {
        &self.config
    }

    /// Store key for the courses of a student in the month containing `today`
    pub fn cache_key(&self, student_id: &str, today: NaiveDate) -> String {
        self.entry_keys(&GradesCacheKey::new(student_id, &today)).courses
    }

    /// Courses for the current month, using server-local time
    pub async fn fetch(&self, credentials: &StudentCredentials) -> Result<Vec<Course>, DomainError> {
        self.fetch_at(credentials, Local::now().date_naive()).await
    }

    /// Courses for the calendar month containing `today`
    pub async fn fetch_at(
        &self,
        credentials: &StudentCredentials,
        today: NaiveDate,
    ) -> Result<Vec<Course>, DomainError> {
        let keys = self.entry_keys(&GradesCacheKey::new(credentials.student_id(), &today));
        let span = info_span!(
            "grades.fetch",
            student_id = %credentials.student_id(),
            cache_key = %keys.courses
        );

        async {
            if let Some(courses) = self.lookup(&keys, credentials).await {
                info!(courses = courses.len(), "Grades cache hit");
                return Ok(courses);
            }

            let lock = self.key_lock(&keys.courses);
            let _guard = lock.lock().await;

            // Another request may have filled the entry while we waited
            if let Some(courses) = self.lookup(&keys, credentials).await {
                info!(courses = courses.len(), "Grades cache hit after waiting on in-flight scrape");
                return Ok(courses);
            }

            info!("Grades cache miss, scraping portal");
            let courses = self.source.fetch_grades(credentials).await.inspect_err(|e| {
                warn!(error = %e, "Portal scrape failed");
            })?;

            self.store(&keys, credentials, &courses).await;
            info!(courses = courses.len(), "Fresh grades scraped");

            Ok(courses)
        }
        .instrument(span)
        .await
    }

    fn entry_keys(&self, key: &GradesCacheKey) -> EntryKeys {
        EntryKeys {
            courses: self
                .course_keys
                .generate_with_namespace(&self.config.namespace, key),
            fingerprint: self
                .fingerprint_keys
                .generate_with_namespace(&self.config.namespace, key),
        }
    }

    /// Returns the per-key scrape lock, dropping locks nobody holds anymore
    fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(lock) = in_flight.get(key).and_then(Weak::upgrade) {
            return lock;
        }

        in_flight.retain(|_, lock| lock.strong_count() > 0);

        let lock = Arc::new(tokio::sync::Mutex::new(()));
        in_flight.insert(key.to_string(), Arc::downgrade(&lock));
        lock
    }

    async fn lookup(&self, keys: &EntryKeys, credentials: &StudentCredentials) -> Option<Vec<Course>> {
        let courses: Vec<Course> = match self.bounded(self.cache.get(&keys.courses)).await {
            Ok(Some(courses)) => courses,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Grades cache read failed, treating as miss");
                return None;
            }
        };

        if !self.config.verify_credentials {
            return Some(courses);
        }

        let fingerprint: String = match self.bounded(self.cache.get(&keys.fingerprint)).await {
            Ok(Some(fingerprint)) => fingerprint,
            Ok(None) => {
                debug!("Cached grades have no credential fingerprint, treating as miss");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Fingerprint read failed, treating as miss");
                return None;
            }
        };

        if self.password_matches(credentials.password(), fingerprint).await {
            Some(courses)
        } else {
            debug!("Password does not match cached fingerprint, treating as miss");
            None
        }
    }

    async fn store(&self, keys: &EntryKeys, credentials: &StudentCredentials, courses: &[Course]) {
        if let Err(e) = self
            .bounded(self.cache.set(&keys.courses, courses, self.config.ttl))
            .await
        {
            warn!(error = %e, "Grades cache write failed, ignoring");
            return;
        }

        if !self.config.verify_credentials {
            return;
        }

        let fingerprint = match self.fingerprint(credentials.password()).await {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                warn!(error = %e, "Could not fingerprint credentials, entry will not be served");
                return;
            }
        };

        if let Err(e) = self
            .bounded(self.cache.set(&keys.fingerprint, &fingerprint, self.config.ttl))
            .await
        {
            warn!(error = %e, "Fingerprint cache write failed, ignoring");
        }
    }

    /// Runs a cache operation under the configured timeout
    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        tokio::time::timeout(self.config.operation_timeout, operation)
            .await
            .map_err(|_| DomainError::cache("Cache operation timed out"))?
    }

    // Argon2 is CPU-bound, so both directions run off the async workers

    async fn fingerprint(&self, password: &str) -> Result<String, DomainError> {
        let fingerprints = Arc::clone(&self.fingerprints);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || fingerprints.fingerprint(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Fingerprint task failed: {}", e)))?
    }

    async fn password_matches(&self, password: &str, fingerprint: String) -> bool {
        let fingerprints = Arc::clone(&self.fingerprints);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || fingerprints.matches(&password, &fingerprint))
            .await
            .unwrap_or(false)
    }
}
