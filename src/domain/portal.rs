//! Upstream portal abstraction

use async_trait::async_trait;
use std::fmt::Debug;

use super::grades::{Course, StudentCredentials};
use crate::domain::DomainError;

/// Source of fresh grade records for a student
///
/// One call runs the whole authenticated scrape: a new session, a login and
/// a grades fetch, strictly in that order. Implementations never reuse a
/// session across calls.
#[async_trait]
pub trait GradesSource: Send + Sync + Debug {
    async fn fetch_grades(&self, credentials: &StudentCredentials) -> Result<Vec<Course>, DomainError>;
}
