//! Cache key generation for monthly grade snapshots

use std::fmt::{self, Debug};

use chrono::Datelike;

/// Identifies one cached grades result: a student in a calendar month
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GradesCacheKey {
    pub student_id: String,
    pub year: i32,
    pub month: u32,
}

impl GradesCacheKey {
    /// Derives the key for `student_id` in the calendar month containing `now`
    pub fn new(student_id: impl Into<String>, now: &impl Datelike) -> Self {
        Self {
            student_id: student_id.into(),
            year: now.year(),
            month: now.month(),
        }
    }
}

impl fmt::Display for GradesCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:04}-{:02}", self.student_id, self.year, self.month)
    }
}

/// Trait for turning a grades key into a store key
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates the store key from the given components
    fn generate(&self, key: &GradesCacheKey) -> String;

    /// Generates a key with a namespace prefix
    fn generate_with_namespace(&self, namespace: &str, key: &GradesCacheKey) -> String {
        format!("{}:{}", namespace, self.generate(key))
    }
}

/// Renders `<studentId>:<YYYY>-<MM>` with an optional sub-namespace
#[derive(Debug, Clone, Default)]
pub struct MonthlyKeyGenerator {
    scope: Option<String>,
}

impl MonthlyKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefixes every generated key with `scope:` (e.g. "auth")
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

impl CacheKeyGenerator for MonthlyKeyGenerator {
    fn generate(&self, key: &GradesCacheKey) -> String {
        match &self.scope {
            Some(scope) => format!("{}:{}", scope, key),
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_key_zero_pads_month() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let key = GradesCacheKey::new("S1001", &now);

        assert_eq!(key.to_string(), "S1001:2026-03");
    }

    #[test]
    fn test_key_changes_across_month_boundary() {
        let end_of_month = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let next_month = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 1).unwrap();

        let a = GradesCacheKey::new("S1001", &end_of_month);
        let b = GradesCacheKey::new("S1001", &next_month);

        assert_ne!(a, b);
        assert_eq!(b.to_string(), "S1001:2026-02");
    }

    #[test]
    fn test_key_stable_within_month() {
        let early = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 10, 31, 23, 0, 0).unwrap();

        assert_eq!(
            GradesCacheKey::new("S1001", &early),
            GradesCacheKey::new("S1001", &late)
        );
    }

    #[test]
    fn test_generate_with_namespace() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let key = GradesCacheKey::new("S1001", &now);

        let generator = MonthlyKeyGenerator::new();
        assert_eq!(generator.generate_with_namespace("cgpa", &key), "cgpa:S1001:2026-10");
    }

    #[test]
    fn test_scoped_generator() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let key = GradesCacheKey::new("S1001", &now);

        let generator = MonthlyKeyGenerator::new().with_scope("auth");
        assert_eq!(
            generator.generate_with_namespace("cgpa", &key),
            "cgpa:auth:S1001:2026-10"
        );
    }
}
