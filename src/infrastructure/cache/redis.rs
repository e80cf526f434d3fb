//! Shared grades store backed by Redis

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::cache::Cache;
use crate::domain::DomainError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Month snapshots in Redis, expired by the server through `SET EX`
///
/// The gateway never deletes keys. `ConnectionManager` reconnects after
/// transient failures.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    key_prefix: Option<String>,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    pub async fn connect(url: &str, key_prefix: Option<String>) -> Result<Self, DomainError> {
        let client = Client::open(url)
            .map_err(|e| DomainError::cache(format!("Invalid Redis URL: {}", e)))?;

        let connection = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| DomainError::cache("Timed out connecting to Redis"))?
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            connection,
            key_prefix,
        })
    }

    fn stored_key(&self, key: &str) -> String {
        stored_key(self.key_prefix.as_deref(), key)
    }
}

fn stored_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection.clone();

        conn.get::<_, Option<String>>(self.stored_key(key))
            .await
            .map_err(|e| DomainError::cache(format!("Redis GET '{}' failed: {}", key, e)))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        // EX rejects 0
        let seconds = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(self.stored_key(key), value, seconds)
            .await
            .map_err(|e| DomainError::cache(format!("Redis SET '{}' failed: {}", key, e)))
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        conn.exists::<_, bool>(self.stored_key(key))
            .await
            .map_err(|e| DomainError::cache(format!("Redis EXISTS '{}' failed: {}", key, e)))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        let mut conn = self.connection.clone();

        let seconds: i64 = conn
            .ttl(self.stored_key(key))
            .await
            .map_err(|e| DomainError::cache(format!("Redis TTL '{}' failed: {}", key, e)))?;

        // -2 missing, -1 no expiry
        Ok(u64::try_from(seconds).ok().map(Duration::from_secs))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::cache(format!("Redis PING failed: {}", e)))
    }
}
