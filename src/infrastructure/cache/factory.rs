//! Picks the grades cache store from configuration

use std::fmt;
use std::sync::Arc;

use crate::config::CacheSettings;
use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::InMemoryCache;
use super::redis::RedisCache;

/// Store that holds the monthly grade snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// Process-local moka store, lost on restart
    InMemory { max_capacity: u64 },
    /// Shared Redis store, for several gateway instances
    Redis {
        url: String,
        key_prefix: Option<String>,
    },
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory { .. } => write!(f, "in_memory"),
            Self::Redis { .. } => write!(f, "redis"),
        }
    }
}

impl TryFrom<&CacheSettings> for CacheBackend {
    type Error = DomainError;

    fn try_from(settings: &CacheSettings) -> Result<Self, Self::Error> {
        match settings.backend.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "memory" => Ok(Self::InMemory {
                max_capacity: settings.max_capacity,
            }),
            "redis" => {
                let url = settings
                    .redis_url
                    .clone()
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| {
                        DomainError::configuration("cache.redis_url is required for the redis backend")
                    })?;

                Ok(Self::Redis {
                    url,
                    key_prefix: settings.key_prefix.clone(),
                })
            }
            other => Err(DomainError::configuration(format!(
                "Unknown cache backend '{}', expected in_memory or redis",
                other
            ))),
        }
    }
}

impl CacheBackend {
    /// Opens the store. Redis is contacted here, so a bad URL fails startup.
    pub async fn connect(&self) -> Result<Arc<dyn Cache>, DomainError> {
        match self {
            Self::InMemory { max_capacity } => Ok(Arc::new(InMemoryCache::new(*max_capacity))),
            Self::Redis { url, key_prefix } => {
                Ok(Arc::new(RedisCache::connect(url, key_prefix.clone()).await?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;
    use crate::domain::Course;
    use std::time::Duration;

    fn settings(backend: &str) -> CacheSettings {
        CacheSettings {
            backend: backend.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_settings_select_in_memory() {
        let backend = CacheBackend::try_from(&CacheSettings::default()).unwrap();
        assert_eq!(backend, CacheBackend::InMemory { max_capacity: 10_000 });
        assert_eq!(backend.to_string(), "in_memory");
    }

    #[test]
    fn test_redis_settings() {
        let settings = CacheSettings {
            backend: "Redis".to_string(),
            redis_url: Some("redis://cache:6379".to_string()),
            key_prefix: Some("nile".to_string()),
            ..Default::default()
        };

        assert_eq!(
            CacheBackend::try_from(&settings).unwrap(),
            CacheBackend::Redis {
                url: "redis://cache:6379".to_string(),
                key_prefix: Some("nile".to_string()),
            }
        );
    }

    #[test]
    fn test_redis_without_url_is_configuration_error() {
        let result = CacheBackend::try_from(&settings("redis"));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_unknown_backend_is_configuration_error() {
        let result = CacheBackend::try_from(&settings("memcached"));
        match result {
            Err(DomainError::Configuration { message }) => assert!(message.contains("memcached")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_in_memory_backend_holds_month_entry() {
        let cache = CacheBackend::InMemory { max_capacity: 10 }.connect().await.unwrap();
        let courses = vec![Course::new("CSC301", "Algorithms", 3).with_grade("A")];

        cache
            .set("cgpa:S1001:2026-10", &courses, Duration::from_secs(86_400))
            .await
            .unwrap();

        let cached: Option<Vec<Course>> = cache.get("cgpa:S1001:2026-10").await.unwrap();
        assert_eq!(cached, Some(courses));
        assert!(cache.get_raw("cgpa:S1001:2026-11").await.unwrap().is_none());
    }
}
