//! Solution scoring.
//!
//! The score of a solution is the preference weight it actually satisfies:
//!
//! ```text
//! score = Σ_p Σ_t solution[p][t] × variant[p][t]
//! ```
//!
//! where `variant` is the untouched table the trial started from. A
//! selected pair keeps degree 1 in the solution, so each filled task
//! contributes the original degree of its person.
//!
//! Identical solution tables always score the same against the same
//! variant; [`ScoreMemo`] caches scores by table signature.

use std::collections::HashMap;

use crate::models::ConstraintsTable;

/// Scores `solution` against the variant it was produced from.
///
/// Cells outside the common shape contribute nothing.
pub fn score_solution(solution: &ConstraintsTable, variant: &ConstraintsTable) -> u64 {
    solution
        .rows()
        .iter()
        .zip(variant.rows())
        .flat_map(|(s, v)| s.iter().zip(v))
        .map(|(s, v)| u64::from(*s) * u64::from(*v))
        .sum()
}

/// Memoized scorer keyed by (variant index, solution signature).
#[derive(Debug, Clone, Default)]
pub struct ScoreMemo {
    scores: HashMap<(usize, u64), u64>,
    hits: usize,
}

impl ScoreMemo {
    /// Creates an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores `solution` against `variants[variant_index]`, reusing a
    /// cached result for an identical solution table.
    pub fn score(
        &mut self,
        variant_index: usize,
        solution: &ConstraintsTable,
        variant: &ConstraintsTable,
    ) -> u64 {
        let key = (variant_index, solution.signature());
        if let Some(&score) = self.scores.get(&key) {
            self.hits += 1;
            return score;
        }
        let score = score_solution(solution, variant);
        self.scores.insert(key, score);
        score
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of distinct solutions scored.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether nothing has been scored yet.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant() -> ConstraintsTable {
        let mut t = ConstraintsTable::new().with_tasks(["Cook", "Clean"]);
        t.add_person("Ann", Some(vec![3, 1])).unwrap();
        t.add_person("Bo", Some(vec![2, 2])).unwrap();
        t
    }

    #[test]
    fn test_score_counts_satisfied_degrees() {
        let base = variant();
        let mut a = base.clone();
        a.select("Ann", "Cook").unwrap();
        a.select("Bo", "Clean").unwrap();
        // 3 + 2
        assert_eq!(score_solution(&a, &base), 5);

        let mut b = base.clone();
        b.select("Ann", "Clean").unwrap();
        b.select("Bo", "Cook").unwrap();
        // 1 + 2
        assert_eq!(score_solution(&b, &base), 3);
    }

    #[test]
    fn test_score_of_unresolved_table() {
        let base = variant();
        // Untouched table scores Σ d²
        assert_eq!(score_solution(&base, &base), 9 + 1 + 4 + 4);
    }

    #[test]
    fn test_memo_agrees_with_direct() {
        let base = variant();
        let mut solved = base.clone();
        solved.select("Ann", "Cook").unwrap();
        solved.select("Bo", "Clean").unwrap();

        let mut memo = ScoreMemo::new();
        assert!(memo.is_empty());
        let first = memo.score(0, &solved, &base);
        let second = memo.score(0, &solved.clone(), &base);
        assert_eq!(first, score_solution(&solved, &base));
        assert_eq!(first, second);
        assert_eq!(memo.hits(), 1);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_memo_separates_variants() {
        let base = variant();
        let mut other = base.clone();
        other.set_preference("Ann", "Cook", 10).unwrap();

        let mut solved = base.clone();
        solved.select("Ann", "Cook").unwrap();
        solved.select("Bo", "Clean").unwrap();

        let mut memo = ScoreMemo::new();
        assert_eq!(memo.score(0, &solved, &base), 5);
        assert_eq!(memo.score(1, &solved, &other), 12);
        assert_eq!(memo.hits(), 0);
        assert_eq!(memo.len(), 2);
    }
}
