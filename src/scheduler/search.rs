//! Multi-trial search and winner selection.
//!
//! # Algorithm
//!
//! 1. Fan the base table out into variants through the [`VariantHook`].
//! 2. For each variant, resolve the incomplete policy against its shape
//!    and run `order` independent trials, each on its own copy and its own
//!    RNG stream.
//! 3. Score every solved trial against its originating variant and keep
//!    the highest score. Ties go to the solution produced first
//!    (variant order, then trial order).
//!
//! Trials share no mutable state. With `parallel` enabled they run on the
//! rayon pool; each trial's RNG is derived from (seed, variant, trial), so
//! the outcome is identical to a sequential run with the same seed.

use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::score::ScoreMemo;
use super::trial::{run_trial, TrialOutcome};
use crate::config::{IncompletePolicy, SchedulerConfig};
use crate::error::{AssignError, Result};
use crate::models::{ConstraintsTable, Pairing};
use crate::variants::{IdentityHook, VariantHook};

/// Trials run between two scoring passes; bounds memory held at once.
const CHUNK_SIZE: usize = 256;

/// A solved trial with its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Index of the originating variant.
    pub variant: usize,
    /// Satisfied preference weight.
    pub score: u64,
    /// The resolved table.
    pub table: ConstraintsTable,
}

impl Solution {
    /// Task → person pairings of this solution.
    pub fn pairing(&self) -> Pairing {
        self.table.extract_pairs()
    }

    /// Consumes the solution, returning the resolved table.
    pub fn into_table(self) -> ConstraintsTable {
        self.table
    }
}

/// Every solved trial of a run, with counts.
#[derive(Debug, Clone)]
pub struct TrialBatch {
    /// Seed the run used.
    pub seed: u64,
    /// The variants trials ran against.
    pub variants: Vec<ConstraintsTable>,
    /// Solved tables tagged with their variant index, in production order.
    pub solutions: Vec<(usize, ConstraintsTable)>,
    /// Number of solved trials.
    pub solved: usize,
    /// Number of failed trials.
    pub failed: usize,
    /// Trials skipped because the time limit passed.
    pub timed_out: usize,
}

/// Outcome of [`Scheduler::optimal_solution`].
///
/// `best == None` means no trial produced a solution; this is a normal
/// result, not an error.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Seed the run used; pass it back through the config to replay.
    pub seed: u64,
    /// Number of variants produced by the hook.
    pub variant_count: usize,
    /// Number of solved trials.
    pub solved: usize,
    /// Number of failed trials.
    pub failed: usize,
    /// Trials skipped because the time limit passed.
    pub timed_out: usize,
    /// Highest-scoring solution, if any trial succeeded.
    pub best: Option<Solution>,
}

impl SearchReport {
    /// Whether any trial succeeded.
    pub fn found(&self) -> bool {
        self.best.is_some()
    }

    /// Best score, if any.
    pub fn best_score(&self) -> Option<u64> {
        self.best.as_ref().map(|s| s.score)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RunCounts {
    solved: usize,
    failed: usize,
    timed_out: usize,
}

/// Randomized greedy assignment search.
///
/// # Example
///
/// ```
/// use u_assign::config::{IncompletePolicy, SchedulerConfig};
/// use u_assign::models::ConstraintsTable;
/// use u_assign::scheduler::Scheduler;
///
/// let mut table = ConstraintsTable::new().with_tasks(["T1", "T2"]);
/// table.add_person("P1", Some(vec![1, 0])).unwrap();
/// table.add_person("P2", Some(vec![0, 1])).unwrap();
///
/// let scheduler = Scheduler::new(table)
///     .with_config(SchedulerConfig::new().with_order(10).with_random_seed(1));
/// let report = scheduler.optimal_solution(IncompletePolicy::Standard).unwrap();
///
/// let best = report.best.unwrap();
/// assert_eq!(best.score, 2);
/// assert_eq!(best.pairing().person_for("T2"), Some("P2"));
/// ```
#[derive(Clone)]
pub struct Scheduler {
    table: ConstraintsTable,
    config: SchedulerConfig,
    hook: Arc<dyn VariantHook>,
}

impl Scheduler {
    /// Creates a scheduler with default config and no variant hook.
    pub fn new(table: ConstraintsTable) -> Self {
        Self {
            table,
            config: SchedulerConfig::default(),
            hook: Arc::new(IdentityHook),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the number of trials per variant.
    pub fn with_order(mut self, order: usize) -> Self {
        self.config.order = order;
        self
    }

    /// Sets the variant hook.
    pub fn with_hook<H: VariantHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    /// The base table.
    pub fn table(&self) -> &ConstraintsTable {
        &self.table
    }

    /// The configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Runs all trials and returns every solved table.
    pub fn generate_solutions(&self, policy: IncompletePolicy) -> Result<TrialBatch> {
        let mut solutions = Vec::new();
        let (seed, variants, counts) = self.drive(policy, |v, _, table| {
            solutions.push((v, table));
        })?;
        Ok(TrialBatch {
            seed,
            variants,
            solutions,
            solved: counts.solved,
            failed: counts.failed,
            timed_out: counts.timed_out,
        })
    }

    /// Runs all trials and returns the highest-scoring solution.
    pub fn optimal_solution(&self, policy: IncompletePolicy) -> Result<SearchReport> {
        let mut memo = ScoreMemo::new();
        let mut best: Option<Solution> = None;

        let (seed, variants, counts) = self.drive(policy, |v, variant, table| {
            let score = memo.score(v, &table, variant);
            if best.as_ref().map_or(true, |b| score > b.score) {
                debug!(variant = v, score, "new best solution");
                best = Some(Solution {
                    variant: v,
                    score,
                    table,
                });
            }
        })?;

        match &best {
            Some(b) => info!(
                solved = counts.solved,
                failed = counts.failed,
                best_score = b.score,
                memo_hits = memo.hits(),
                "search finished"
            ),
            None => info!(
                solved = counts.solved,
                failed = counts.failed,
                "search finished, no solution found"
            ),
        }

        Ok(SearchReport {
            seed,
            variant_count: variants.len(),
            solved: counts.solved,
            failed: counts.failed,
            timed_out: counts.timed_out,
            best,
        })
    }

    /// Runs the search with the configured incomplete policy.
    pub fn run(&self) -> Result<SearchReport> {
        self.optimal_solution(self.config.allow_incomplete)
    }

    /// Drives every trial, handing each solved table to `on_solved`
    /// together with its variant index and variant, in production order.
    fn drive<F>(
        &self,
        policy: IncompletePolicy,
        mut on_solved: F,
    ) -> Result<(u64, Vec<ConstraintsTable>, RunCounts)>
    where
        F: FnMut(usize, &ConstraintsTable, ConstraintsTable),
    {
        let seed = self
            .config
            .random_seed
            .unwrap_or_else(|| rand::rng().random());
        let mut hook_rng = ChaCha8Rng::seed_from_u64(seed);
        let variants = self.hook.variants(&self.table, &mut hook_rng)?;
        if variants.is_empty() {
            return Err(AssignError::validation(format!(
                "variant hook '{}' returned no variants",
                self.hook.name()
            )));
        }

        let (people, tasks) = self.table.shape();
        info!(
            people,
            tasks,
            variants = variants.len(),
            order = self.config.order,
            seed,
            parallel = self.config.parallel,
            "search started"
        );

        let deadline = self.config.time_limit().map(|limit| Instant::now() + limit);
        let mut counts = RunCounts::default();

        for (v, variant) in variants.iter().enumerate() {
            let allow_incomplete = policy.allows_incomplete(variant.shape());
            debug!(
                variant = v,
                people = variant.shape().0,
                tasks = variant.shape().1,
                allow_incomplete,
                "running variant"
            );

            let attempt = |trial: usize| -> Option<TrialOutcome> {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    return None;
                }
                let mut rng = trial_rng(seed, v, trial);
                Some(run_trial(variant, allow_incomplete, &mut rng))
            };

            let mut start = 0;
            while start < self.config.order {
                let end = (start + CHUNK_SIZE).min(self.config.order);
                let outcomes: Vec<Option<TrialOutcome>> = if self.config.parallel {
                    (start..end).into_par_iter().map(attempt).collect()
                } else {
                    (start..end).map(attempt).collect()
                };

                for outcome in outcomes {
                    match outcome {
                        Some(TrialOutcome::Solved(table)) => {
                            counts.solved += 1;
                            on_solved(v, variant, table);
                        }
                        Some(TrialOutcome::Failed) => counts.failed += 1,
                        None => counts.timed_out += 1,
                    }
                }
                start = end;
            }
        }

        if counts.timed_out > 0 {
            warn!(
                timed_out = counts.timed_out,
                "time limit reached before all trials ran"
            );
        }
        info!(
            solved = counts.solved,
            failed = counts.failed,
            "{} solutions found, {} solutions failed",
            counts.solved,
            counts.failed
        );

        Ok((seed, variants, counts))
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("shape", &self.table.shape())
            .field("config", &self.config)
            .field("hook", &self.hook.name())
            .finish()
    }
}

/// Independent RNG for one trial, identical no matter which thread runs it.
fn trial_rng(seed: u64, variant: usize, trial: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1 + variant as u64));
    rng.set_stream(trial as u64);
    rng
}
