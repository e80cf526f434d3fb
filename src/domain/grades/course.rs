//! Course record entity

use serde::{Deserialize, Serialize};

/// A single course row from the student's grades page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Short course identifier (e.g. "CSC301")
    pub code: String,
    /// Human-readable course name
    pub title: String,
    /// Grade as rendered by the portal, `None` while the course is in progress
    pub grade: Option<String>,
    /// Credit weight used for CGPA aggregation
    pub credit_units: u32,
    /// Term label when the page groups rows by semester
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
}

impl Course {
    pub fn new(code: impl Into<String>, title: impl Into<String>, credit_units: u32) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            grade: None,
            credit_units,
            semester: None,
        }
    }

    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.grade = Some(grade.into());
        self
    }

    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = Some(semester.into());
        self
    }

    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }
}
