//! Error types for table operations and scheduling runs.
//!
//! Only caller mistakes are errors: unknown names and malformed input.
//! "No candidate for a task", "trial failed" and "no solution found" are
//! ordinary outcomes and are reported through return values.

use thiserror::Error;

use crate::models::EntityKind;

/// Errors raised by [`ConstraintsTable`](crate::models::ConstraintsTable)
/// operations and by the [`Scheduler`](crate::scheduler::Scheduler).
///
/// Every mutating table operation checks its inputs before touching the
/// matrix, so an `Err` always leaves the table unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    /// A referenced person or task name is not in the table.
    #[error("unknown {kind}: '{name}'")]
    NotFound {
        /// Which list was searched.
        kind: EntityKind,
        /// The missing name.
        name: String,
    },

    /// Malformed input: wrong vector length, bad degree value,
    /// inconsistent table data.
    #[error("invalid input: {0}")]
    Validation(String),
}

impl AssignError {
    /// Shorthand for a missing person.
    pub fn person_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Person,
            name: name.into(),
        }
    }

    /// Shorthand for a missing task.
    pub fn task_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Task,
            name: name.into(),
        }
    }

    /// Builds a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AssignError>;
