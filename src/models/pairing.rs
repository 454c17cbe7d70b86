//! Final task → person pairings extracted from a resolved table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One finalized task → person pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// Task name.
    pub task: String,
    /// Person assigned to the task.
    pub person: String,
}

impl Pair {
    /// Creates a pair.
    pub fn new(task: impl Into<String>, person: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            person: person.into(),
        }
    }
}

/// Structured result of [`ConstraintsTable::extract_pairs`](super::ConstraintsTable::extract_pairs).
///
/// `pairs` follows task-list order; the unassigned lists follow their
/// own list order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    /// Filled tasks.
    pub pairs: Vec<Pair>,
    /// People who received no task.
    pub unassigned_people: Vec<String>,
    /// Tasks left unfilled.
    pub unassigned_tasks: Vec<String>,
}

impl Pairing {
    /// Person assigned to `task`, if any.
    pub fn person_for(&self, task: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.task == task)
            .map(|p| p.person.as_str())
    }

    /// Task → person lookup map.
    pub fn to_map(&self) -> HashMap<&str, &str> {
        self.pairs
            .iter()
            .map(|p| (p.task.as_str(), p.person.as_str()))
            .collect()
    }

    /// Number of filled tasks.
    pub fn assigned_count(&self) -> usize {
        self.pairs.len()
    }

    /// Whether every task was filled.
    pub fn is_complete(&self) -> bool {
        self.unassigned_tasks.is_empty()
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pair in &self.pairs {
            writeln!(f, "{}: {}", pair.task, pair.person)?;
        }
        for person in &self.unassigned_people {
            writeln!(f, "{person} not assigned")?;
        }
        for task in &self.unassigned_tasks {
            writeln!(f, "{task} not assigned")?;
        }
        Ok(())
    }
}
