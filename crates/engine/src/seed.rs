//! Reserve Seeding Policy — funds children of zero-balance parents.
//!
//! When the model predicts 0 for a parent but the user still asked for
//! categories under it, a bounded percentage of income is withdrawn from
//! the reserve ("Savings") and split evenly across the children. Parents
//! with no policy entry are never seeded — essentials stay at whatever the
//! model said. An exhausted reserve is not an error: the children simply
//! get zeros.

use std::collections::HashMap;

use smartspend_core::{round2, CanonicalAllocation};
use tracing::debug;

/// Per-parent seed percentages of income.
///
/// Immutable for the process lifetime. A parent absent from the table has
/// percentage 0 and is never seeded.
#[derive(Debug, Clone)]
pub struct SeedPolicy {
    pct_by_parent: HashMap<String, f64>,
}

impl SeedPolicy {
    pub fn new(pct_by_parent: HashMap<String, f64>) -> Self {
        Self { pct_by_parent }
    }

    /// Seed percentage for a parent (0 if the parent has no policy).
    pub fn pct(&self, parent: &str) -> f64 {
        self.pct_by_parent.get(parent).copied().unwrap_or(0.0)
    }

    /// The policy table.
    pub fn table(&self) -> &HashMap<String, f64> {
        &self.pct_by_parent
    }

    /// Seed `children` of a zero-balance `parent` from the reserve.
    ///
    /// Withdraws `min(pct * income, reserve)` and splits it evenly —
    /// seeding is a floor guarantee, so caller weights never apply. The
    /// reserve entry in `allocation` is decremented by exactly the seeded
    /// total in the same call; every other entry is left alone.
    pub fn seed(
        &self,
        parent: &str,
        children: &[String],
        income: f64,
        allocation: &mut CanonicalAllocation,
    ) -> HashMap<String, f64> {
        if children.is_empty() {
            return HashMap::new();
        }

        let zeros = || children.iter().map(|c| (c.clone(), 0.0)).collect();

        let pct = self.pct(parent);
        if pct <= 0.0 {
            // No seeding policy for this parent; reserve untouched.
            return zeros();
        }

        let reserve = allocation.reserve();
        if income <= 0.0 || reserve <= 0.0 {
            return zeros();
        }

        let seed_total = (pct * income).min(reserve);
        if seed_total <= 0.0 {
            return zeros();
        }

        let each = round2(seed_total / children.len() as f64);
        allocation.draw_reserve(seed_total);
        debug!(parent, seed_total, reserve_after = allocation.reserve(), "seeded from reserve");

        children.iter().map(|c| (c.clone(), each)).collect()
    }
}

impl Default for SeedPolicy {
    /// The documented default: essentials (Food, Transport, Housing,
    /// Utilities, Savings) are absent and therefore never auto-seeded.
    fn default() -> Self {
        let mut pct_by_parent = HashMap::new();
        pct_by_parent.insert("Education".to_string(), 0.02);
        pct_by_parent.insert("Healthcare".to_string(), 0.01);
        pct_by_parent.insert("Entertainment".to_string(), 0.01);
        pct_by_parent.insert("Emergency".to_string(), 0.03);
        pct_by_parent.insert("Other".to_string(), 0.005);
        Self::new(pct_by_parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartspend_core::DEFAULT_CANONICAL;

    fn allocation_with_savings(savings: f64) -> CanonicalAllocation {
        let canonical: Vec<String> = DEFAULT_CANONICAL.iter().map(|s| s.to_string()).collect();
        let mut pred = HashMap::new();
        pred.insert("Savings".to_string(), savings);
        CanonicalAllocation::from_prediction(&canonical, &pred)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn seeds_bounded_by_income_pct() {
        let policy = SeedPolicy::default();
        let mut alloc = allocation_with_savings(50_000.0);
        let out = policy.seed("Education", &names(&["Tuition"]), 100_000.0, &mut alloc);
        // 2% of 100000 = 2000, well under the reserve.
        assert_eq!(out["Tuition"], 2000.0);
        assert_eq!(alloc.reserve(), 48_000.0);
    }

    #[test]
    fn seeds_bounded_by_reserve() {
        let policy = SeedPolicy::default();
        let mut alloc = allocation_with_savings(500.0);
        let out = policy.seed("Emergency", &names(&["Buffer"]), 100_000.0, &mut alloc);
        // 3% of income is 3000 but only 500 is left in the reserve.
        assert_eq!(out["Buffer"], 500.0);
        assert_eq!(alloc.reserve(), 0.0);
    }

    #[test]
    fn no_policy_parent_never_seeds() {
        let policy = SeedPolicy::default();
        let mut alloc = allocation_with_savings(10_000.0);
        let out = policy.seed("Food", &names(&["Groceries"]), 100_000.0, &mut alloc);
        assert_eq!(out["Groceries"], 0.0);
        assert_eq!(alloc.reserve(), 10_000.0);
    }

    #[test]
    fn exhausted_reserve_seeds_zeros() {
        let policy = SeedPolicy::default();
        let mut alloc = allocation_with_savings(0.0);
        let out = policy.seed("Healthcare", &names(&["Dentist"]), 100_000.0, &mut alloc);
        assert_eq!(out["Dentist"], 0.0);
        assert_eq!(alloc.reserve(), 0.0);
    }

    #[test]
    fn nonpositive_income_seeds_zeros() {
        let policy = SeedPolicy::default();
        let mut alloc = allocation_with_savings(10_000.0);
        let out = policy.seed("Education", &names(&["Books"]), 0.0, &mut alloc);
        assert_eq!(out["Books"], 0.0);
        assert_eq!(alloc.reserve(), 10_000.0);
    }

    #[test]
    fn even_split_across_children_ignores_weights_by_design() {
        let policy = SeedPolicy::default();
        let mut alloc = allocation_with_savings(10_000.0);
        let out = policy.seed(
            "Entertainment",
            &names(&["Games", "Movies"]),
            100_000.0,
            &mut alloc,
        );
        // 1% of 100000 = 1000, split evenly.
        assert_eq!(out["Games"], 500.0);
        assert_eq!(out["Movies"], 500.0);
        assert_eq!(alloc.reserve(), 9000.0);
    }

    #[test]
    fn empty_children_is_a_noop() {
        let policy = SeedPolicy::default();
        let mut alloc = allocation_with_savings(10_000.0);
        let out = policy.seed("Education", &[], 100_000.0, &mut alloc);
        assert!(out.is_empty());
        assert_eq!(alloc.reserve(), 10_000.0);
    }

    #[test]
    fn one_reserve_deduction_per_call() {
        let policy = SeedPolicy::default();
        let mut alloc = allocation_with_savings(10_000.0);
        let before = alloc.reserve();
        let out = policy.seed("Other", &names(&["Pets"]), 100_000.0, &mut alloc);
        let seeded: f64 = out.values().sum();
        assert_eq!(before - alloc.reserve(), seeded);
    }
}
