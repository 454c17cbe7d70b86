//! Variant hooks: fan one table out into independent variants before trials.
//!
//! A hook receives the base table and a seeded RNG and returns a
//! non-empty list of tables. Each variant is trialed independently and
//! every solution is scored against the variant it came from. Hooks may
//! restructure people and tasks (merge, remove) but never mutate their
//! input.
//!
//! # Provided hooks
//!
//! | Hook | Variants | Purpose |
//! |------|----------|---------|
//! | [`IdentityHook`] | 1 | No transformation (default) |
//! | [`PartialPairingHook`] | N | Randomly pair partial participants into joint people |
//!
//! Any `Fn(&ConstraintsTable, &mut dyn RngCore) -> Result<Vec<ConstraintsTable>>`
//! closure is also a hook.

use rand::RngCore;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::ConstraintsTable;

/// Transforms a base table into one or more variants.
pub trait VariantHook: Send + Sync {
    /// Hook name for logging.
    fn name(&self) -> &'static str {
        "custom"
    }

    /// Produces the variants. Must not be empty.
    fn variants(
        &self,
        table: &ConstraintsTable,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ConstraintsTable>>;
}

impl<F> VariantHook for F
where
    F: Fn(&ConstraintsTable, &mut dyn RngCore) -> Result<Vec<ConstraintsTable>> + Send + Sync,
{
    fn variants(
        &self,
        table: &ConstraintsTable,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ConstraintsTable>> {
        self(table, rng)
    }
}

/// Returns the table unchanged as the single variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHook;

impl VariantHook for IdentityHook {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn variants(
        &self,
        table: &ConstraintsTable,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<ConstraintsTable>> {
        Ok(vec![table.clone()])
    }
}

/// Pairs partial participants (e.g. half-plan members) into joint people.
///
/// People whose name contains `marker` only take part half the time, so
/// two of them share one task. In every variant the marked people are
/// paired off: the last remaining one picks a partner among the others
/// by [`ConstraintsTable::compatibility_draw`] and the two are merged.
/// With an odd count one marked person stays single.
///
/// Different variants pair differently, giving the trial engine several
/// pairings to choose from.
#[derive(Debug, Clone)]
pub struct PartialPairingHook {
    marker: String,
    variant_count: usize,
}

impl PartialPairingHook {
    /// Default name marker.
    pub const DEFAULT_MARKER: &'static str = "(half)";
    /// Default number of variants.
    pub const DEFAULT_VARIANTS: usize = 6;

    /// Creates a hook with the default marker and variant count.
    pub fn new() -> Self {
        Self {
            marker: Self::DEFAULT_MARKER.to_string(),
            variant_count: Self::DEFAULT_VARIANTS,
        }
    }

    /// Sets the name marker identifying partial participants.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Sets the number of variants (at least 1).
    pub fn with_variant_count(mut self, count: usize) -> Self {
        self.variant_count = count.max(1);
        self
    }

    /// Builds one paired variant.
    fn pair_once(&self, table: &ConstraintsTable, rng: &mut dyn RngCore) -> Result<ConstraintsTable> {
        let mut variant = table.clone();
        let mut partials: Vec<String> = variant
            .people()
            .iter()
            .filter(|p| p.contains(&self.marker))
            .cloned()
            .collect();

        let leftover = partials.len() % 2;
        if leftover == 1 {
            warn!(
                count = partials.len(),
                marker = %self.marker,
                "odd number of partial participants, one stays unpaired"
            );
        }

        while partials.len() > leftover {
            let Some(person) = partials.pop() else { break };
            let Some(partner) = variant
                .compatibility_draw(&person, &partials, rng)?
                .map(str::to_owned)
            else {
                break;
            };
            let merged = variant.merge_people(&person, &partner)?;
            debug!(%merged, "paired partial participants");
            partials.retain(|p| *p != partner);
        }

        Ok(variant)
    }
}

impl Default for PartialPairingHook {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantHook for PartialPairingHook {
    fn name(&self) -> &'static str {
        "partial_pairing"
    }

    fn variants(
        &self,
        table: &ConstraintsTable,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ConstraintsTable>> {
        (0..self.variant_count)
            .map(|_| self.pair_once(table, rng))
            .collect()
    }
}
