//! CGPA aggregation over course records

use serde::{Deserialize, Serialize};

use super::Course;

/// Grade point on the 5-point scale, `None` for grades that carry no points
pub fn grade_point(grade: &str) -> Option<u32> {
    match grade.trim().to_ascii_uppercase().as_str() {
        "A" => Some(5),
        "B" => Some(4),
        "C" => Some(3),
        "D" => Some(2),
        "E" => Some(1),
        "F" => Some(0),
        _ => None,
    }
}

/// Aggregate view of a course list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub course_count: usize,
    pub total_credit_units: u64,
    /// Credit units of courses whose grade maps to a grade point
    pub graded_credit_units: u64,
    pub quality_points: u64,
    pub cgpa: f64,
}

impl GradeSummary {
    pub fn from_courses(courses: &[Course]) -> Self {
        let mut total_credit_units: u64 = 0;
        let mut graded_credit_units: u64 = 0;
        let mut quality_points: u64 = 0;

        for course in courses {
            let units = u64::from(course.credit_units);
            total_credit_units = total_credit_units.saturating_add(units);

            if let Some(point) = course.grade.as_deref().and_then(grade_point) {
                graded_credit_units = graded_credit_units.saturating_add(units);
                quality_points = quality_points.saturating_add(u64::from(point) * units);
            }
        }

        let cgpa = if graded_credit_units == 0 {
            0.0
        } else {
            let raw = quality_points as f64 / graded_credit_units as f64;
            (raw * 100.0).round() / 100.0
        };

        Self {
            course_count: courses.len(),
            total_credit_units,
            graded_credit_units,
            quality_points,
            cgpa,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_point_scale() {
        assert_eq!(grade_point("A"), Some(5));
        assert_eq!(grade_point(" b "), Some(4));
        assert_eq!(grade_point("F"), Some(0));
        assert_eq!(grade_point("IP"), None);
        assert_eq!(grade_point(""), None);
    }

    #[test]
    fn test_summary_weights_by_credit_units() {
        let courses = vec![
            Course::new("CSC301", "Algorithms", 3).with_grade("A"),
            Course::new("MTH201", "Linear Algebra", 2).with_grade("C"),
            Course::new("GST101", "Use of English", 1).with_grade("B"),
        ];

        let summary = GradeSummary::from_courses(&courses);

        assert_eq!(summary.course_count, 3);
        assert_eq!(summary.total_credit_units, 6);
        assert_eq!(summary.graded_credit_units, 6);
        assert_eq!(summary.quality_points, 15 + 6 + 4);
        assert_eq!(summary.cgpa, 4.17);
    }

    #[test]
    fn test_summary_excludes_pending_courses() {
        let courses = vec![
            Course::new("CSC301", "Algorithms", 3).with_grade("B"),
            Course::new("CSC405", "Compilers", 3),
        ];

        let summary = GradeSummary::from_courses(&courses);

        assert_eq!(summary.total_credit_units, 6);
        assert_eq!(summary.graded_credit_units, 3);
        assert_eq!(summary.cgpa, 4.0);
    }

    #[test]
    fn test_summary_does_not_overflow_on_large_units() {
        let courses = vec![
            Course::new("CSC301", "Algorithms", u32::MAX).with_grade("A"),
            Course::new("CSC302", "Databases", u32::MAX).with_grade("A"),
        ];

        let summary = GradeSummary::from_courses(&courses);

        assert_eq!(summary.total_credit_units, 2 * u64::from(u32::MAX));
        assert_eq!(summary.quality_points, 10 * u64::from(u32::MAX));
        assert_eq!(summary.cgpa, 5.0);
    }

    #[test]
    fn test_summary_of_empty_list() {
        let summary = GradeSummary::from_courses(&[]);

        assert_eq!(summary.course_count, 0);
        assert_eq!(summary.cgpa, 0.0);
    }
}
