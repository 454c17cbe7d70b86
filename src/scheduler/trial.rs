//! One randomized greedy trial.
//!
//! # Algorithm
//!
//! On a private copy of the variant, repeat until the table is resolved
//! (all tasks closed or all people closed):
//!
//! 1. Take the most constrained open task (smallest total candidate weight).
//!    If none is available under the policy, the trial fails.
//! 2. Run the weighted lottery over the task's open candidates.
//! 3. Winner → `select(person, task)`. No candidate → close the task unfilled.
//!
//! Every step closes exactly one task, so a trial takes at most
//! `tasks` steps.
//!
//! # Complexity
//! O(t² · p) per trial for p people and t tasks.

use rand::Rng;
use tracing::trace;

use crate::models::ConstraintsTable;

/// How a trial ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialOutcome {
    /// The table was resolved; holds the finished table.
    Solved(ConstraintsTable),
    /// An open task had no candidate weight under the strict policy.
    Failed,
}

impl TrialOutcome {
    /// Whether the trial produced a solution.
    pub fn is_solved(&self) -> bool {
        matches!(self, TrialOutcome::Solved(_))
    }

    /// The finished table, if solved.
    pub fn into_table(self) -> Option<ConstraintsTable> {
        match self {
            TrialOutcome::Solved(table) => Some(table),
            TrialOutcome::Failed => None,
        }
    }
}

/// Runs one trial against a copy of `variant`.
///
/// `allow_incomplete` is the already-resolved policy: when `true`, a task
/// without candidates is closed unfilled; when `false`, it fails the trial.
/// Candidate weights are summed over open people only, matching who the
/// lottery can draw.
pub fn run_trial<R: Rng + ?Sized>(
    variant: &ConstraintsTable,
    allow_incomplete: bool,
    rng: &mut R,
) -> TrialOutcome {
    let mut table = variant.clone();

    while !table.is_resolved() {
        let Some(t) = table.most_constrained_at(allow_incomplete, false) else {
            trace!("open task without candidates, trial failed");
            return TrialOutcome::Failed;
        };

        match table.weighted_draw_at(t, rng) {
            Some(p) => {
                trace!(
                    task = table.task_name(t),
                    person = table.person_name(p),
                    "selected"
                );
                table.select_at(p, t);
            }
            None => {
                trace!(task = table.task_name(t), "no candidate, closing unfilled");
                table.close_task_at(t);
            }
        }
    }

    TrialOutcome::Solved(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pair, Status};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn diagonal() -> ConstraintsTable {
        let mut t = ConstraintsTable::new().with_tasks(["T1", "T2"]);
        t.add_person("P1", Some(vec![1, 0])).unwrap();
        t.add_person("P2", Some(vec![0, 1])).unwrap();
        t
    }

    #[test]
    fn test_trial_solves_forced_instance() {
        let variant = diagonal();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let table = run_trial(&variant, false, &mut rng).into_table().unwrap();
            assert!(table.is_resolved());
            assert_eq!(
                table.extract_pairs().pairs,
                vec![Pair::new("T1", "P1"), Pair::new("T2", "P2")]
            );
        }
    }

    #[test]
    fn test_trial_does_not_mutate_variant() {
        let variant = diagonal();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let _ = run_trial(&variant, false, &mut rng);
        assert_eq!(variant, diagonal());
    }

    #[test]
    fn test_trial_fails_on_empty_task_strict() {
        let mut variant = diagonal();
        variant.add_task("Nobody", None).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(run_trial(&variant, false, &mut rng), TrialOutcome::Failed);
    }

    #[test]
    fn test_trial_closes_empty_task_when_allowed() {
        let mut variant = diagonal();
        variant.add_task("Nobody", None).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let table = run_trial(&variant, true, &mut rng).into_table().unwrap();
        assert_eq!(table.task_status("Nobody").unwrap(), Status::Closed);
        let pairing = table.extract_pairs();
        assert_eq!(pairing.assigned_count(), 2);
        assert_eq!(pairing.unassigned_tasks, vec!["Nobody".to_string()]);
    }

    #[test]
    fn test_trial_stops_when_people_run_out() {
        // 1 person, 3 acceptable tasks: resolved after one selection
        let mut variant = ConstraintsTable::new().with_tasks(["A", "B", "C"]);
        variant.add_person("solo", Some(vec![1, 2, 1])).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let table = run_trial(&variant, false, &mut rng).into_table().unwrap();
        let pairing = table.extract_pairs();
        assert_eq!(pairing.assigned_count(), 1);
        assert_eq!(pairing.unassigned_tasks.len(), 2);
        assert!(pairing.unassigned_people.is_empty());
    }

    #[test]
    fn test_trial_picks_most_constrained_first() {
        // "Rare" only has one candidate; greedy fills it before "Common"
        // can take that person.
        let mut variant = ConstraintsTable::new().with_tasks(["Common", "Rare"]);
        variant.add_person("a", Some(vec![5, 1])).unwrap();
        variant.add_person("b", Some(vec![5, 0])).unwrap();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let table = run_trial(&variant, false, &mut rng).into_table().unwrap();
            let pairing = table.extract_pairs();
            assert_eq!(pairing.person_for("Rare"), Some("a"));
            assert_eq!(pairing.person_for("Common"), Some("b"));
        }
    }

    #[test]
    fn test_trial_on_preselected_table() {
        let mut variant = diagonal();
        variant.add_person("P3", Some(vec![1, 1])).unwrap();
        variant.select("P3", "T1").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let table = run_trial(&variant, false, &mut rng).into_table().unwrap();
        let pairing = table.extract_pairs();
        assert_eq!(pairing.person_for("T1"), Some("P3"));
        assert_eq!(pairing.person_for("T2"), Some("P2"));
        assert_eq!(pairing.unassigned_people, vec!["P1".to_string()]);
    }
}
