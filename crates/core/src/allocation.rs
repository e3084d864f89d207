//! The per-request canonical allocation table.
//!
//! [`CanonicalAllocation`] is built fresh from a predictor's output at the
//! start of every request and mutated in place while that request is
//! assembled: a parent's balance is debited when it is distributed to
//! custom children, and the reserve is drawn down when a zero parent is
//! seeded. It is an owned value threaded through one call stack, never a
//! shared or cached structure — cross-request isolation is structural, not
//! a convention.

use std::collections::HashMap;

/// The canonical category whose balance backs seed withdrawals.
pub const RESERVE_CATEGORY: &str = "Savings";

/// The canonical parent every unresolvable category falls back to.
pub const FALLBACK_CATEGORY: &str = "Other";

/// The canonical category that is never left at zero.
pub const ALWAYS_FUNDED: &str = "Emergency";

/// The default canonical category list, in model-column order.
///
/// The predictor's training artifact may supply its own list via
/// configuration; this is the documented default. "Other" is a synthetic
/// bucket the model may not output — the allocation table always carries it.
pub const DEFAULT_CANONICAL: [&str; 10] = [
    "Food",
    "Transport",
    "Housing",
    "Utilities",
    "Entertainment",
    "Savings",
    "Healthcare",
    "Education",
    "Emergency",
    "Other",
];

/// Round to 2 decimal places — the engine's money precision.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Mutable canonical-category → amount table for a single request.
///
/// Invariants:
/// - every stored amount is `>= 0` at every observation point;
/// - an entry for [`FALLBACK_CATEGORY`] always exists;
/// - the total is non-increasing across mutations (money moves out or is
///   withdrawn, never created).
#[derive(Debug, Clone)]
pub struct CanonicalAllocation {
    amounts: HashMap<String, f64>,
}

impl CanonicalAllocation {
    /// Build the table from a predictor's raw output.
    ///
    /// Only names in `canonical` are admitted, in that order; negative
    /// predictions are clamped to 0 and everything is rounded to 2
    /// decimals. A missing [`FALLBACK_CATEGORY`] entry is added at 0.
    pub fn from_prediction(canonical: &[String], prediction: &HashMap<String, f64>) -> Self {
        let mut amounts = HashMap::with_capacity(canonical.len() + 1);
        for name in canonical {
            let raw = prediction.get(name).copied().unwrap_or(0.0);
            amounts.insert(name.clone(), round2(raw.max(0.0)));
        }
        amounts.entry(FALLBACK_CATEGORY.to_string()).or_insert(0.0);
        Self { amounts }
    }

    /// Current balance for a canonical category (0 if absent).
    pub fn amount(&self, name: &str) -> f64 {
        self.amounts.get(name).copied().unwrap_or(0.0)
    }

    /// Whether the table carries an entry for this exact canonical name.
    pub fn contains(&self, name: &str) -> bool {
        self.amounts.contains_key(name)
    }

    /// Overwrite a balance, rounded and floored at zero.
    pub fn set(&mut self, name: &str, value: f64) {
        self.amounts
            .insert(name.to_string(), round2(value.max(0.0)));
    }

    /// Deduct `amount` from a balance, flooring the result at zero.
    pub fn debit(&mut self, name: &str, amount: f64) {
        let balance = self.amount(name);
        self.set(name, balance - amount);
    }

    /// Current reserve ([`RESERVE_CATEGORY`]) balance.
    pub fn reserve(&self) -> f64 {
        self.amount(RESERVE_CATEGORY)
    }

    /// Withdraw from the reserve, flooring at zero.
    pub fn draw_reserve(&mut self, amount: f64) {
        self.debit(RESERVE_CATEGORY, amount);
    }

    /// Sum of all balances.
    pub fn total(&self) -> f64 {
        round2(self.amounts.values().sum())
    }

    /// Iterate over (name, amount) entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.amounts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Consume the table, yielding the raw map.
    pub fn into_amounts(self) -> HashMap<String, f64> {
        self.amounts
    }
}
