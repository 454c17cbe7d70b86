//! Preference matrix store.
//!
//! A `ConstraintsTable` holds the people list, the task list, a
//! person × task matrix of preference degrees, and an open/closed status
//! per person and per task.
//!
//! # Degrees
//!
//! | Degree | Meaning |
//! |--------|---------|
//! | 0 | Forbidden pairing |
//! | 1 | Acceptable (baseline preference) |
//! | n > 1 | Stronger preference, used as a relative lottery weight |
//!
//! After [`ConstraintsTable::select`], a degree of exactly 1 in a closed
//! row/column marks a final pairing.
//!
//! # Identity
//!
//! Names are unique within each list and map to positions through a hash
//! index. Removing an entity shifts every later entity down by one.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use super::{Pair, Pairing, Status};
use crate::error::{AssignError, Result};
use crate::validation::validate_table_data;

/// Preference or constraint strength for one person-task pair.
pub type Degree = u32;

/// Separator used when merging two entities into one.
pub const MERGE_SEPARATOR: &str = " and ";

/// Converts a raw numeric cell (e.g. from a spreadsheet export) into a degree.
///
/// Rejects negative, non-finite and fractional values.
pub fn checked_degree(value: f64) -> Result<Degree> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > Degree::MAX as f64 {
        return Err(AssignError::validation(format!(
            "degree must be a non-negative integer, got {value}"
        )));
    }
    Ok(value as Degree)
}

/// Preference matrix store.
///
/// # Example
///
/// ```
/// use u_assign::models::ConstraintsTable;
///
/// let mut table = ConstraintsTable::new()
///     .with_tasks(["Monday Cook", "Monday Cleaner"])
///     .with_people(["Ann", "Bo"]);
/// table.set_preference("Ann", "Monday Cook", 2).unwrap();
/// table.set_preference("Bo", "Monday Cleaner", 1).unwrap();
///
/// assert_eq!(table.shape(), (2, 2));
/// assert_eq!(table.most_constrained_open_task(false, false), Some("Monday Cleaner"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableData", into = "TableData")]
pub struct ConstraintsTable {
    people: Vec<String>,
    tasks: Vec<String>,
    person_index: HashMap<String, usize>,
    task_index: HashMap<String, usize>,
    /// One row per person, one column per task.
    rows: Vec<Vec<Degree>>,
    person_status: Vec<Status>,
    task_status: Vec<Status>,
}

impl ConstraintsTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tasks with all-zero candidate columns.
    pub fn with_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for task in tasks {
            self.push_or_reset_task(task.into(), None);
        }
        self
    }

    /// Adds people with all-zero degree rows.
    pub fn with_people<I, S>(mut self, people: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for person in people {
            self.push_or_reset_person(person.into(), None);
        }
        self
    }

    // ======================== Mutation ========================

    /// Adds a person, or overwrites the degree row of an existing one.
    ///
    /// `degrees` must have one entry per task; `None` means all zeros.
    pub fn add_person(
        &mut self,
        name: impl Into<String>,
        degrees: Option<Vec<Degree>>,
    ) -> Result<()> {
        let name = name.into();
        if let Some(d) = &degrees {
            self.check_len(d.len(), self.tasks.len(), "degrees")?;
        }
        self.push_or_reset_person(name, degrees);
        Ok(())
    }

    /// Adds a task, or overwrites the candidate column of an existing one.
    ///
    /// `weights` must have one entry per person; `None` means all zeros.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        weights: Option<Vec<Degree>>,
    ) -> Result<()> {
        let name = name.into();
        if let Some(w) = &weights {
            self.check_len(w.len(), self.people.len(), "candidate weights")?;
        }
        self.push_or_reset_task(name, weights);
        Ok(())
    }

    /// Removes a person and their row.
    pub fn remove_person(&mut self, name: &str) -> Result<()> {
        let p = self.person_idx(name)?;
        self.rows.remove(p);
        self.person_status.remove(p);
        self.people.remove(p);
        self.person_index = index_of(&self.people);
        Ok(())
    }

    /// Removes a task and its column.
    pub fn remove_task(&mut self, name: &str) -> Result<()> {
        let t = self.task_idx(name)?;
        for row in &mut self.rows {
            row.remove(t);
        }
        self.task_status.remove(t);
        self.tasks.remove(t);
        self.task_index = index_of(&self.tasks);
        Ok(())
    }

    /// Writes one cell.
    pub fn set_preference(&mut self, person: &str, task: &str, degree: Degree) -> Result<()> {
        let p = self.person_idx(person)?;
        let t = self.task_idx(task)?;
        self.rows[p][t] = degree;
        Ok(())
    }

    /// Replaces two people with one joint person.
    ///
    /// The joint row is the elementwise product of both rows, so a task
    /// accepts the pair only if it accepts each of them. The new person is
    /// named `"<p1> and <p2>"`, appended last and open. Returns its name.
    pub fn merge_people(&mut self, p1: &str, p2: &str) -> Result<String> {
        let a = self.person_idx(p1)?;
        let b = self.person_idx(p2)?;
        if a == b {
            return Err(AssignError::validation(format!(
                "cannot merge person '{p1}' with itself"
            )));
        }
        let merged: Vec<Degree> = self.rows[a]
            .iter()
            .zip(&self.rows[b])
            .map(|(x, y)| x.saturating_mul(*y))
            .collect();
        let name = format!("{p1}{MERGE_SEPARATOR}{p2}");

        self.remove_person(p1)?;
        self.remove_person(p2)?;
        self.push_or_reset_person(name.clone(), Some(merged));
        Ok(name)
    }

    /// Replaces two tasks with one joint task (elementwise product of columns).
    ///
    /// The new task is named `"<t1> and <t2>"`, appended last and open.
    /// Returns its name.
    pub fn merge_tasks(&mut self, t1: &str, t2: &str) -> Result<String> {
        let a = self.task_idx(t1)?;
        let b = self.task_idx(t2)?;
        if a == b {
            return Err(AssignError::validation(format!(
                "cannot merge task '{t1}' with itself"
            )));
        }
        let merged: Vec<Degree> = self
            .rows
            .iter()
            .map(|row| row[a].saturating_mul(row[b]))
            .collect();
        let name = format!("{t1}{MERGE_SEPARATOR}{t2}");

        self.remove_task(t1)?;
        self.remove_task(t2)?;
        self.push_or_reset_task(name.clone(), Some(merged));
        Ok(name)
    }

    /// Marks a person closed.
    pub fn close_person(&mut self, person: &str) -> Result<()> {
        let p = self.person_idx(person)?;
        self.person_status[p] = Status::Closed;
        Ok(())
    }

    /// Marks a task closed.
    pub fn close_task(&mut self, task: &str) -> Result<()> {
        let t = self.task_idx(task)?;
        self.close_task_at(t);
        Ok(())
    }

    /// Finalizes a pairing.
    ///
    /// Zeroes the person's row and the task's column, writes 1 at their
    /// intersection, then closes both.
    pub fn select(&mut self, person: &str, task: &str) -> Result<()> {
        let p = self.person_idx(person)?;
        let t = self.task_idx(task)?;
        self.select_at(p, t);
        Ok(())
    }

    /// Restricts `tasks` to the candidate pool `people`.
    ///
    /// Every person outside `people` gets degree 0 on every task in `tasks`.
    pub fn apply_block_constraint<P, T>(&mut self, people: &[P], tasks: &[T]) -> Result<()>
    where
        P: AsRef<str>,
        T: AsRef<str>,
    {
        let mut allowed = vec![false; self.people.len()];
        for p in people {
            allowed[self.person_idx(p.as_ref())?] = true;
        }
        let columns = tasks
            .iter()
            .map(|t| self.task_idx(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        for (row, _) in self.rows.iter_mut().zip(&allowed).filter(|(_, ok)| !**ok) {
            for &t in &columns {
                row[t] = 0;
            }
        }
        Ok(())
    }

    // ======================== Queries ========================

    /// Number of people and number of tasks.
    pub fn shape(&self) -> (usize, usize) {
        (self.people.len(), self.tasks.len())
    }

    /// People in list order.
    pub fn people(&self) -> &[String] {
        &self.people
    }

    /// Tasks in list order.
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    /// Whether a person with this name exists.
    pub fn contains_person(&self, name: &str) -> bool {
        self.person_index.contains_key(name)
    }

    /// Whether a task with this name exists.
    pub fn contains_task(&self, name: &str) -> bool {
        self.task_index.contains_key(name)
    }

    /// Task-indexed degree row of a person.
    pub fn person_degrees(&self, person: &str) -> Result<&[Degree]> {
        let p = self.person_idx(person)?;
        Ok(&self.rows[p])
    }

    /// Person-indexed candidate column of a task.
    pub fn task_candidates(&self, task: &str) -> Result<Vec<Degree>> {
        let t = self.task_idx(task)?;
        Ok(self.rows.iter().map(|row| row[t]).collect())
    }

    /// Degree of a single pair.
    pub fn degree(&self, person: &str, task: &str) -> Result<Degree> {
        let p = self.person_idx(person)?;
        let t = self.task_idx(task)?;
        Ok(self.rows[p][t])
    }

    /// Status of a person.
    pub fn person_status(&self, person: &str) -> Result<Status> {
        Ok(self.person_status[self.person_idx(person)?])
    }

    /// Status of a task.
    pub fn task_status(&self, task: &str) -> Result<Status> {
        Ok(self.task_status[self.task_idx(task)?])
    }

    /// Rows of the degree matrix, one per person in list order.
    pub fn rows(&self) -> &[Vec<Degree>] {
        &self.rows
    }

    /// Dot product of two people's degree rows.
    pub fn compatibility(&self, p1: &str, p2: &str) -> Result<u64> {
        let a = self.person_idx(p1)?;
        let b = self.person_idx(p2)?;
        Ok(self.compatibility_at(a, b))
    }

    /// Total candidate weight of a task.
    ///
    /// With `include_closed_rows == false`, closed people contribute nothing.
    pub fn column_sum(&self, task: &str, include_closed_rows: bool) -> Result<u64> {
        let t = self.task_idx(task)?;
        Ok(self.column_sum_at(t, include_closed_rows))
    }

    /// Open task with the smallest total candidate weight.
    ///
    /// Closed tasks are never returned. Ties go to the task that comes
    /// first in list order. Returns `None` when no task is open, or when
    /// some open task has zero weight and `allow_incomplete` is false
    /// (the table cannot be completed under the strict policy).
    pub fn most_constrained_open_task(
        &self,
        allow_incomplete: bool,
        include_closed_rows: bool,
    ) -> Option<&str> {
        self.most_constrained_at(allow_incomplete, include_closed_rows)
            .map(|t| self.tasks[t].as_str())
    }

    /// Weighted lottery over the candidates of a task.
    ///
    /// Each open person draws `u ~ U[0, 1)` scaled by their degree for the
    /// task; the largest product wins (first in list order on ties).
    /// Returns `Ok(None)` when every product is zero.
    pub fn weighted_draw<R: Rng + ?Sized>(
        &self,
        task: &str,
        rng: &mut R,
    ) -> Result<Option<&str>> {
        let t = self.task_idx(task)?;
        Ok(self
            .weighted_draw_at(t, rng)
            .map(|p| self.people[p].as_str()))
    }

    /// Picks a partner for `person` from `pool`.
    ///
    /// Each pool member draws `u ~ U[0, 1)` scaled by the square root of
    /// its [`compatibility`](Self::compatibility) with `person`; the
    /// largest value wins. With an empty pool returns `Ok(None)`; when every
    /// value is zero the first pool member is returned.
    pub fn compatibility_draw<'p, S, R>(
        &self,
        person: &str,
        pool: &'p [S],
        rng: &mut R,
    ) -> Result<Option<&'p str>>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let a = self.person_idx(person)?;
        let members = pool
            .iter()
            .map(|q| self.person_idx(q.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut best: Option<(usize, f64)> = None;
        for (i, &b) in members.iter().enumerate() {
            let weight = (self.compatibility_at(a, b) as f64).sqrt();
            let value = rng.random::<f64>() * weight;
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((i, value));
            }
        }
        Ok(best.map(|(i, _)| pool[i].as_ref()))
    }

    /// Whether every task is closed or every person is closed.
    pub fn is_resolved(&self) -> bool {
        self.task_status.iter().all(|s| s.is_closed())
            || self.person_status.iter().all(|s| s.is_closed())
    }

    /// Extracts final pairings.
    ///
    /// A task is paired when it is closed and its column holds exactly one
    /// non-zero cell, equal to 1, in a closed person's row. Everything
    /// else is reported as unassigned, in list order.
    pub fn extract_pairs(&self) -> Pairing {
        let mut pairs = Vec::new();
        let mut person_used = vec![false; self.people.len()];
        let mut task_used = vec![false; self.tasks.len()];

        for (t, task) in self.tasks.iter().enumerate() {
            if self.task_status[t].is_open() {
                continue;
            }
            let mut nonzero = (0..self.people.len()).filter(|&p| self.rows[p][t] != 0);
            let (Some(p), None) = (nonzero.next(), nonzero.next()) else {
                continue;
            };
            if self.rows[p][t] == 1 && self.person_status[p].is_closed() {
                pairs.push(Pair::new(task.clone(), self.people[p].clone()));
                person_used[p] = true;
                task_used[t] = true;
            }
        }

        Pairing {
            pairs,
            unassigned_people: unused(&self.people, &person_used),
            unassigned_tasks: unused(&self.tasks, &task_used),
        }
    }

    /// Stable 64-bit signature of the matrix and statuses.
    ///
    /// Equal tables always produce equal signatures, across runs and
    /// threads (fixed-key hasher).
    pub fn signature(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.shape().hash(&mut hasher);
        self.rows.hash(&mut hasher);
        self.person_status.hash(&mut hasher);
        self.task_status.hash(&mut hasher);
        hasher.finish()
    }

    // ======================== Index-level operations ========================
    //
    // Used by the trial loop, which works on positions to avoid name
    // lookups and borrows across mutation.

    pub(crate) fn task_name(&self, t: usize) -> &str {
        &self.tasks[t]
    }

    pub(crate) fn person_name(&self, p: usize) -> &str {
        &self.people[p]
    }

    pub(crate) fn close_task_at(&mut self, t: usize) {
        self.task_status[t] = Status::Closed;
    }

    pub(crate) fn select_at(&mut self, p: usize, t: usize) {
        self.rows[p].iter_mut().for_each(|d| *d = 0);
        for row in &mut self.rows {
            row[t] = 0;
        }
        self.rows[p][t] = 1;
        self.person_status[p] = Status::Closed;
        self.task_status[t] = Status::Closed;
    }

    pub(crate) fn column_sum_at(&self, t: usize, include_closed_rows: bool) -> u64 {
        self.rows
            .iter()
            .zip(&self.person_status)
            .filter(|(_, s)| include_closed_rows || s.is_open())
            .map(|(row, _)| u64::from(row[t]))
            .sum()
    }

    pub(crate) fn most_constrained_at(
        &self,
        allow_incomplete: bool,
        include_closed_rows: bool,
    ) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for t in (0..self.tasks.len()).filter(|&t| self.task_status[t].is_open()) {
            let sum = self.column_sum_at(t, include_closed_rows);
            if sum == 0 && !allow_incomplete {
                return None;
            }
            if best.map_or(true, |(_, b)| sum < b) {
                best = Some((t, sum));
            }
        }
        best.map(|(t, _)| t)
    }

    pub(crate) fn weighted_draw_at<R: Rng + ?Sized>(
        &self,
        t: usize,
        rng: &mut R,
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (p, (row, status)) in self.rows.iter().zip(&self.person_status).enumerate() {
            let weight = if status.is_open() { row[t] } else { 0 };
            let value = rng.random::<f64>() * f64::from(weight);
            if value > 0.0 && best.map_or(true, |(_, v)| value > v) {
                best = Some((p, value));
            }
        }
        best.map(|(p, _)| p)
    }

    fn compatibility_at(&self, a: usize, b: usize) -> u64 {
        self.rows[a]
            .iter()
            .zip(&self.rows[b])
            .map(|(x, y)| u64::from(*x) * u64::from(*y))
            .sum()
    }

    // ======================== Internals ========================

    fn person_idx(&self, name: &str) -> Result<usize> {
        self.person_index
            .get(name)
            .copied()
            .ok_or_else(|| AssignError::person_not_found(name))
    }

    fn task_idx(&self, name: &str) -> Result<usize> {
        self.task_index
            .get(name)
            .copied()
            .ok_or_else(|| AssignError::task_not_found(name))
    }

    fn check_len(&self, got: usize, expected: usize, what: &str) -> Result<()> {
        if got != expected {
            return Err(AssignError::validation(format!(
                "expected {expected} {what}, got {got}"
            )));
        }
        Ok(())
    }

    /// Caller guarantees `degrees` has one entry per task.
    fn push_or_reset_person(&mut self, name: String, degrees: Option<Vec<Degree>>) {
        let row = degrees.unwrap_or_else(|| vec![0; self.tasks.len()]);
        match self.person_index.get(&name) {
            Some(&p) => self.rows[p] = row,
            None => {
                self.person_index.insert(name.clone(), self.people.len());
                self.people.push(name);
                self.rows.push(row);
                self.person_status.push(Status::Open);
            }
        }
    }

    /// Caller guarantees `weights` has one entry per person.
    fn push_or_reset_task(&mut self, name: String, weights: Option<Vec<Degree>>) {
        let column = weights.unwrap_or_else(|| vec![0; self.people.len()]);
        match self.task_index.get(&name) {
            Some(&t) => {
                for (row, w) in self.rows.iter_mut().zip(column) {
                    row[t] = w;
                }
            }
            None => {
                self.task_index.insert(name.clone(), self.tasks.len());
                self.tasks.push(name);
                for (row, w) in self.rows.iter_mut().zip(column) {
                    row.push(w);
                }
                self.task_status.push(Status::Open);
            }
        }
    }
}

fn index_of(names: &[String]) -> HashMap<String, usize> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.clone(), i))
        .collect()
}

fn unused(names: &[String], used: &[bool]) -> Vec<String> {
    names
        .iter()
        .zip(used)
        .filter(|(_, u)| !**u)
        .map(|(n, _)| n.clone())
        .collect()
}

// ======================== Serialized form ========================

/// Plain, serializable form of a [`ConstraintsTable`].
///
/// This is the ingestion format: a list of people, a list of tasks, one
/// preference row per person, and the names of closed entities.
///
/// ```json
/// {
///   "people": ["Ann", "Bo"],
///   "tasks": ["Cook", "Clean"],
///   "preferences": [[2, 0], [1, 1]],
///   "closed_people": [],
///   "closed_tasks": []
/// }
/// ```
///
/// An empty `preferences` list means all zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    /// Person names in list order.
    pub people: Vec<String>,
    /// Task names in list order.
    pub tasks: Vec<String>,
    /// One row per person, one degree per task.
    #[serde(default)]
    pub preferences: Vec<Vec<Degree>>,
    /// Names of closed people.
    #[serde(default)]
    pub closed_people: Vec<String>,
    /// Names of closed tasks.
    #[serde(default)]
    pub closed_tasks: Vec<String>,
}

impl TryFrom<TableData> for ConstraintsTable {
    type Error = AssignError;

    fn try_from(data: TableData) -> Result<Self> {
        if let Err(errors) = validate_table_data(&data) {
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AssignError::Validation(message));
        }

        let rows = if data.preferences.is_empty() {
            vec![vec![0; data.tasks.len()]; data.people.len()]
        } else {
            data.preferences
        };
        let person_status = data
            .people
            .iter()
            .map(|p| status_of(data.closed_people.contains(p)))
            .collect();
        let task_status = data
            .tasks
            .iter()
            .map(|t| status_of(data.closed_tasks.contains(t)))
            .collect();

        Ok(Self {
            person_index: index_of(&data.people),
            task_index: index_of(&data.tasks),
            people: data.people,
            tasks: data.tasks,
            rows,
            person_status,
            task_status,
        })
    }
}

impl From<ConstraintsTable> for TableData {
    fn from(table: ConstraintsTable) -> Self {
        let closed_people = closed_names(&table.people, &table.person_status);
        let closed_tasks = closed_names(&table.tasks, &table.task_status);
        Self {
            people: table.people,
            tasks: table.tasks,
            preferences: table.rows,
            closed_people,
            closed_tasks,
        }
    }
}

fn status_of(closed: bool) -> Status {
    if closed {
        Status::Closed
    } else {
        Status::Open
    }
}

fn closed_names(names: &[String], status: &[Status]) -> Vec<String> {
    names
        .iter()
        .zip(status)
        .filter(|(_, s)| s.is_closed())
        .map(|(n, _)| n.clone())
        .collect()
}
