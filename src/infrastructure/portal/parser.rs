//! Grades page parser
//!
//! Turns the portal's grades table into [`Course`] records. Columns are
//! found by header text rather than position, so reordered or extra columns
//! are tolerated. A page that no longer contains a recognizable table fails
//! loudly instead of yielding an empty list.

use scraper::{ElementRef, Html};
use tracing::warn;

use super::markers::selector;
use crate::domain::{Course, DomainError};

/// Tables the portal marks up as the grades listing
const GRADES_TABLE: &str = "table#grades, table.grades, table.grade-table";

const CODE_HEADERS: &[&str] = &["code", "course code", "coursecode"];
const TITLE_HEADERS: &[&str] = &[
    "title",
    "course title",
    "course name",
    "name",
    "course",
    "description",
];
const GRADE_HEADERS: &[&str] = &["grade", "letter grade", "final grade"];
const CREDIT_HEADERS: &[&str] = &[
    "unit",
    "units",
    "credit",
    "credits",
    "cu",
    "credit unit",
    "credit units",
    "credit hours",
    "course unit",
    "course units",
];

/// Largest credit weight a single course can carry
const MAX_CREDIT_UNITS: u32 = 99;

/// Grade cells that mean "not graded yet"
const PENDING_GRADES: &[&str] = &["", "-", "—", "n/a", "na", "ip", "pending"];

/// Column index of each role, taken from a header row
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnLayout {
    code: usize,
    title: usize,
    credit: Option<usize>,
    grade: Option<usize>,
}

impl ColumnLayout {
    /// Recognizes a header row. Requires at least a code and a title column.
    fn from_header(cells: &[String]) -> Option<Self> {
        let mut code = None;
        let mut title = None;
        let mut credit = None;
        let mut grade = None;

        for (index, text) in cells.iter().enumerate() {
            let label = normalize_label(text);
            let label = label.as_str();

            if code.is_none() && CODE_HEADERS.contains(&label) {
                code = Some(index);
            } else if title.is_none() && TITLE_HEADERS.contains(&label) {
                title = Some(index);
            } else if credit.is_none() && CREDIT_HEADERS.contains(&label) {
                credit = Some(index);
            } else if grade.is_none() && GRADE_HEADERS.contains(&label) {
                grade = Some(index);
            }
        }

        Some(Self {
            code: code?,
            title: title?,
            credit,
            grade,
        })
    }

    fn required_cells(&self) -> usize {
        [Some(self.code), Some(self.title), self.credit]
            .into_iter()
            .flatten()
            .max()
            .map_or(0, |index| index + 1)
    }

    /// Extracts one course, or the reason the row was unusable
    fn extract(&self, cells: &[String]) -> Result<Course, String> {
        let credit_column = self
            .credit
            .ok_or_else(|| "no credit units column".to_string())?;

        if cells.len() < self.required_cells() {
            return Err(format!(
                "row has {} cells, expected at least {}",
                cells.len(),
                self.required_cells()
            ));
        }

        let code = cells[self.code].as_str();
        if code.is_empty() {
            return Err("missing course code".to_string());
        }

        let title = cells[self.title].as_str();
        if title.is_empty() {
            return Err(format!("missing title for {}", code));
        }

        let credit_units = parse_credit_units(&cells[credit_column])
            .ok_or_else(|| format!("invalid credit units '{}' for {}", cells[credit_column], code))?;

        let grade = self
            .grade
            .and_then(|index| cells.get(index))
            .and_then(|text| normalize_grade(text));

        let mut course = Course::new(code, title, credit_units);
        course.grade = grade;
        Ok(course)
    }
}

/// Parses the grades page into course records in page order
pub fn parse_grades(html: &str) -> Result<Vec<Course>, DomainError> {
    let document = Html::parse_document(html);

    let table = locate_table(&document)?
        .ok_or_else(|| DomainError::parse_failure("Grades table not found"))?;

    let rows = selector("tr")?;

    let mut layout: Option<ColumnLayout> = None;
    let mut semester: Option<String> = None;
    let mut courses = Vec::new();
    let mut data_rows = 0usize;

    for (row_index, row) in table.select(&rows).enumerate() {
        let cells = read_cells(row);

        if cells.iter().all(|cell| cell.text.is_empty()) {
            continue;
        }

        let texts: Vec<String> = cells.iter().map(|cell| cell.text.clone()).collect();

        if let Some(header) = ColumnLayout::from_header(&texts) {
            if layout.is_none() {
                if header.credit.is_none() {
                    return Err(DomainError::parse_failure(
                        "Grades table has no credit units column",
                    ));
                }
                layout = Some(header);
            }
            continue;
        }

        if cells.len() == 1 {
            semester = Some(texts[0].clone());
            continue;
        }

        // Preamble rows before the header and unrecognized heading rows
        let Some(layout) = layout.as_ref() else {
            continue;
        };
        if cells.iter().all(|cell| cell.is_heading) {
            continue;
        }

        data_rows += 1;
        match layout.extract(&texts) {
            Ok(mut course) => {
                course.semester = semester.clone();
                courses.push(course);
            }
            Err(reason) => warn!(row = row_index, %reason, "Skipping grades row"),
        }
    }

    if layout.is_none() {
        return Err(DomainError::parse_failure(
            "Grades table has no recognizable header row",
        ));
    }

    if data_rows > 0 && courses.is_empty() {
        return Err(DomainError::parse_failure(format!(
            "None of the {} grade rows could be parsed",
            data_rows
        )));
    }

    Ok(courses)
}

/// Finds the grades table by its markup, falling back to the first table
/// whose header has code, title and grade columns
fn locate_table(document: &Html) -> Result<Option<ElementRef<'_>>, DomainError> {
    if let Some(table) = document.select(&selector(GRADES_TABLE)?).next() {
        return Ok(Some(table));
    }

    let tables = selector("table")?;
    let rows = selector("tr")?;

    Ok(document.select(&tables).find(|table| {
        table.select(&rows).any(|row| {
            let texts: Vec<String> = read_cells(row).into_iter().map(|cell| cell.text).collect();
            ColumnLayout::from_header(&texts).is_some_and(|layout| layout.grade.is_some())
        })
    }))
}

struct Cell {
    text: String,
    is_heading: bool,
}

/// Reads the direct `td`/`th` children of a row
fn read_cells(row: ElementRef<'_>) -> Vec<Cell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|element| matches!(element.value().name(), "td" | "th"))
        .map(|element| Cell {
            text: collapse_whitespace(&element.text().collect::<String>()),
            is_heading: element.value().name() == "th",
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercases a header label and turns punctuation into spaces
fn normalize_label(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    collapse_whitespace(&cleaned)
}

fn parse_credit_units(text: &str) -> Option<u32> {
    let text = text.trim();

    let units = match text.parse::<u32>() {
        Ok(units) => units,
        Err(_) => {
            let value = text.parse::<f64>().ok()?;
            if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
                return None;
            }
            value as u32
        }
    };

    (1..=MAX_CREDIT_UNITS).contains(&units).then_some(units)
}

fn normalize_grade(text: &str) -> Option<String> {
    let grade = text.trim();
    let lowered = grade.to_lowercase();

    if PENDING_GRADES.contains(&lowered.as_str()) {
        None
    } else {
        Some(grade.to_string())
    }
}
