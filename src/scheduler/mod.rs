//! Randomized greedy trial engine and best-of-N selection.
//!
//! # Algorithm
//!
//! Each trial repeatedly fills the most constrained open task (smallest
//! total candidate weight) by a weighted lottery over its open candidates.
//! A task with no candidates is either closed unfilled or fails the trial,
//! depending on the [`IncompletePolicy`](crate::config::IncompletePolicy).
//! Many independent trials run per variant and the solution with the
//! highest satisfied preference weight wins.
//!
//! The procedure is a heuristic: it does not guarantee the optimal
//! assignment, but more trials raise the chance of finding it.
//!
//! # References
//!
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems" (most-constrained-first ordering)
//! - Efraimidis & Spirakis (2006), "Weighted Random Sampling with a Reservoir"

mod score;
mod search;
mod trial;

pub use score::{score_solution, ScoreMemo};
pub use search::{Scheduler, SearchReport, Solution, TrialBatch};
pub use trial::{run_trial, TrialOutcome};
