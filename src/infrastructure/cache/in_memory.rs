//! Process-local grades store backed by moka

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct Snapshot {
    json: String,
    deadline: Instant,
}

impl Snapshot {
    fn remaining(&self) -> Option<Duration> {
        self.deadline
            .checked_duration_since(Instant::now())
            .filter(|left| !left.is_zero())
    }
}

/// moka evicts each snapshot at its own deadline
struct UntilDeadline;

impl Expiry<String, Snapshot> for UntilDeadline {
    fn expire_after_create(&self, _key: &String, value: &Snapshot, created_at: Instant) -> Option<Duration> {
        Some(value.deadline.saturating_duration_since(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Snapshot,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.deadline.saturating_duration_since(updated_at))
    }
}

/// Month snapshots kept in this process only
///
/// moka's eviction is lazy, so reads also compare against the deadline.
#[derive(Debug)]
pub struct InMemoryCache {
    entries: MokaCache<String, Snapshot>,
}

impl InMemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(max_capacity)
            .expire_after(UntilDeadline)
            .build();

        Self { entries }
    }

    async fn live(&self, key: &str) -> Option<Snapshot> {
        let snapshot = self.entries.get(key).await?;

        if snapshot.remaining().is_none() {
            self.entries.remove(key).await;
            return None;
        }

        Some(snapshot)
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.live(key).await.map(|snapshot| snapshot.json))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let deadline = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| DomainError::cache(format!("TTL out of range for key '{}'", key)))?;

        let snapshot = Snapshot {
            json: value.to_string(),
            deadline,
        };

        self.entries.insert(key.to_string(), snapshot).await;
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        Ok(self.live(key).await.and_then(|snapshot| snapshot.remaining()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;
    use crate::domain::Course;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn courses() -> Vec<Course> {
        vec![
            Course::new("CSC301", "Algorithms", 3).with_grade("A"),
            Course::new("CSC205", "Data Structures", 3).with_grade("B"),
            Course::new("CSC405", "Compilers", 3),
        ]
    }

    #[tokio::test]
    async fn test_month_snapshot_preserves_course_order() {
        let cache = InMemoryCache::new(100);

        cache.set("cgpa:S1001:2026-10", &courses(), DAY).await.unwrap();

        let cached: Option<Vec<Course>> = cache.get("cgpa:S1001:2026-10").await.unwrap();
        assert_eq!(cached, Some(courses()));
    }

    #[tokio::test]
    async fn test_other_student_and_other_month_miss() {
        let cache = InMemoryCache::new(100);

        cache.set("cgpa:S1001:2026-10", &courses(), DAY).await.unwrap();

        assert!(cache.get_raw("cgpa:S1002:2026-10").await.unwrap().is_none());
        assert!(cache.get_raw("cgpa:S1001:2026-11").await.unwrap().is_none());
        assert!(cache.exists("cgpa:S1001:2026-10").await.unwrap());
    }

    #[tokio::test]
    async fn test_day_ttl_is_reported() {
        let cache = InMemoryCache::new(100);

        cache.set("cgpa:S1001:2026-10", &courses(), DAY).await.unwrap();

        let remaining = cache.ttl("cgpa:S1001:2026-10").await.unwrap().unwrap();
        assert!(remaining > DAY - Duration::from_secs(10));
        assert!(remaining <= DAY);
        assert!(cache.ttl("cgpa:S1002:2026-10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_gone_after_deadline() {
        let cache = InMemoryCache::new(100);

        cache
            .set("cgpa:S1001:2026-10", &courses(), Duration::from_millis(50))
            .await
            .unwrap();
        assert!(cache.exists("cgpa:S1001:2026-10").await.unwrap());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get_raw("cgpa:S1001:2026-10").await.unwrap().is_none());
        assert!(cache.ttl("cgpa:S1001:2026-10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refetch_replaces_snapshot() {
        let cache = InMemoryCache::new(100);
        let mut updated = courses();
        updated[2].grade = Some("A".to_string());

        cache.set("cgpa:S1001:2026-10", &courses(), DAY).await.unwrap();
        cache.set("cgpa:S1001:2026-10", &updated, DAY).await.unwrap();

        let cached: Option<Vec<Course>> = cache.get("cgpa:S1001:2026-10").await.unwrap();
        assert_eq!(cached, Some(updated));
    }

    #[tokio::test]
    async fn test_ping_always_succeeds() {
        assert!(InMemoryCache::new(1).ping().await.is_ok());
    }
}
