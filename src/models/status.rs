//! Open/closed status and entity kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a person or task is still available to the greedy loop.
///
/// Kept beside the degree matrix rather than inside it, so sums and
/// scores only ever see real degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Still eligible for selection.
    #[default]
    Open,
    /// Finalized: selected, or closed without a candidate.
    Closed,
}

impl Status {
    /// Whether the entity is still open.
    #[inline]
    pub fn is_open(self) -> bool {
        self == Status::Open
    }

    /// Whether the entity has been closed.
    #[inline]
    pub fn is_closed(self) -> bool {
        self == Status::Closed
    }
}

/// The two entity lists of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A row of the matrix.
    Person,
    /// A column of the matrix.
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Person => f.write_str("person"),
            EntityKind::Task => f.write_str("task"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_open() {
        let s = Status::default();
        assert!(s.is_open());
        assert!(!s.is_closed());
        assert!(Status::Closed.is_closed());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&Status::Closed).unwrap();
        assert_eq!(json, "\"closed\"");
        let back: Status = serde_json::from_str("\"open\"").unwrap();
        assert_eq!(back, Status::Open);
    }
}
