//! Input validation for externally supplied tables.
//!
//! Checks the structural integrity of [`TableData`] before it becomes a
//! [`ConstraintsTable`](crate::models::ConstraintsTable). Detects:
//! - Duplicate person or task names
//! - Preference matrix with the wrong number of rows
//! - Preference rows with the wrong number of degrees
//! - Closed-entity lists naming people or tasks that don't exist
//!
//! All problems are collected, not just the first one.

use crate::models::TableData;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two people or two tasks share the same name.
    DuplicateName,
    /// The matrix row count differs from the number of people.
    RowCountMismatch,
    /// A row's length differs from the number of tasks.
    RowLengthMismatch,
    /// A closed-entity list names an unknown person or task.
    UnknownReference,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates serialized table data.
///
/// Checks:
/// 1. No duplicate person names
/// 2. No duplicate task names
/// 3. `preferences` is empty or has one row per person
/// 4. Every row has one degree per task
/// 5. `closed_people` / `closed_tasks` reference existing names
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_table_data(data: &TableData) -> ValidationResult {
    let mut errors = Vec::new();

    let people = unique_names(&data.people, "person", &mut errors);
    let tasks = unique_names(&data.tasks, "task", &mut errors);

    if !data.preferences.is_empty() {
        if data.preferences.len() != data.people.len() {
            errors.push(ValidationError::new(
                ValidationErrorKind::RowCountMismatch,
                format!(
                    "Preference matrix has {} rows for {} people",
                    data.preferences.len(),
                    data.people.len()
                ),
            ));
        }
        for (i, row) in data.preferences.iter().enumerate() {
            if row.len() != data.tasks.len() {
                let who = data.people.get(i).map(String::as_str).unwrap_or("?");
                errors.push(ValidationError::new(
                    ValidationErrorKind::RowLengthMismatch,
                    format!(
                        "Row {i} ('{who}') has {} degrees for {} tasks",
                        row.len(),
                        data.tasks.len()
                    ),
                ));
            }
        }
    }

    for name in &data.closed_people {
        if !people.contains(name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Closed person '{name}' is not in the people list"),
            ));
        }
    }
    for name in &data.closed_tasks {
        if !tasks.contains(name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Closed task '{name}' is not in the task list"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn unique_names<'a>(
    names: &'a [String],
    what: &str,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate {what} name: {name}"),
            ));
        }
    }
    seen
}
