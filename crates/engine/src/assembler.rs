//! Recommendation Assembler — orchestrates resolver, splitter, and seeding
//! against one predictor call per request.
//!
//! A request is one linear pass: validate → build the canonical table →
//! partition requested names → per-group split or seed → Emergency floor →
//! return. There is no state outside the call stack, no retries, and no
//! loops back to earlier steps.

use std::collections::HashMap;
use std::sync::Arc;

use smartspend_core::{
    round2, CanonicalAllocation, EngineError, Error, Prediction, Predictor, SpendingProfile,
    ALWAYS_FUNDED, DEFAULT_CANONICAL, FALLBACK_CATEGORY,
};
use tracing::{debug, info};

use crate::resolver::KeywordTable;
use crate::seed::SeedPolicy;
use crate::splitter;

/// Synthetic child name used when the Emergency floor seeds itself.
const FLOOR_CHILD: &str = "__floor__";

/// The budget allocation engine.
///
/// Holds only immutable tables and a shared predictor handle; all mutable
/// state is per-request values on the stack, so one instance serves
/// concurrent requests without locking.
pub struct BudgetEngine {
    predictor: Arc<dyn Predictor>,
    keywords: KeywordTable,
    seed_policy: SeedPolicy,
    canonical: Vec<String>,
}

impl BudgetEngine {
    /// Create an engine with the default keyword table, seed policy, and
    /// canonical category list.
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            predictor,
            keywords: KeywordTable::default(),
            seed_policy: SeedPolicy::default(),
            canonical: DEFAULT_CANONICAL.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the keyword table.
    pub fn with_keywords(mut self, keywords: KeywordTable) -> Self {
        self.keywords = keywords;
        self
    }

    /// Replace the seed policy.
    pub fn with_seed_policy(mut self, seed_policy: SeedPolicy) -> Self {
        self.seed_policy = seed_policy;
        self
    }

    /// Replace the canonical category list (from the training artifact).
    pub fn with_canonical(mut self, canonical: Vec<String>) -> Self {
        self.canonical = canonical;
        self
    }

    /// The canonical category list, in declaration order.
    pub fn canonical(&self) -> &[String] {
        &self.canonical
    }

    /// The resolver's keyword table.
    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    /// The predictor backing this engine.
    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }

    /// Full request path: validate, call the predictor once, assemble.
    ///
    /// Validation happens before the predictor call, so an invalid
    /// profile never reaches the model and no partial work is done.
    pub async fn recommend(
        &self,
        profile: &SpendingProfile,
        requested: &[String],
        weights: Option<&HashMap<String, f64>>,
    ) -> Result<HashMap<String, f64>, Error> {
        validate(profile)?;
        let prediction = self.predictor.predict(profile).await?;
        info!(
            predictor = self.predictor.name(),
            categories = requested.len(),
            "assembling recommendation"
        );
        Ok(self.assemble(profile, requested, weights, &prediction)?)
    }

    /// Assemble a recommendation from an already-obtained prediction.
    ///
    /// Pure given its inputs: identical arguments yield identical output.
    pub fn assemble(
        &self,
        profile: &SpendingProfile,
        requested: &[String],
        weights: Option<&HashMap<String, f64>>,
        prediction: &Prediction,
    ) -> Result<HashMap<String, f64>, EngineError> {
        validate(profile)?;

        let mut allocation = CanonicalAllocation::from_prediction(&self.canonical, prediction);

        // Nothing specific asked: return every canonical bucket as-is.
        if requested.is_empty() {
            return Ok(allocation.into_amounts());
        }

        // Case-insensitive view of the canonical names (Other included).
        let canon_lower: HashMap<String, String> = allocation
            .iter()
            .map(|(name, _)| (name.to_lowercase(), name.to_string()))
            .collect();

        // Partition: direct canonical matches are read-only views at this
        // stage; everything else is a custom name to route.
        let mut out: HashMap<String, f64> = HashMap::new();
        let mut custom: Vec<&String> = Vec::new();
        for raw in requested {
            match canon_lower.get(&raw.to_lowercase()) {
                Some(key) => {
                    out.insert(raw.clone(), allocation.amount(key));
                }
                None => custom.push(raw),
            }
        }

        // Group custom names by resolved parent, first-seen order.
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for name in custom {
            let parent = self.keywords.resolve(name);
            let parent_key = if allocation.contains(parent) {
                parent.to_string()
            } else {
                FALLBACK_CATEGORY.to_string()
            };
            match groups.iter_mut().find(|(p, _)| *p == parent_key) {
                Some((_, children)) => children.push(name.clone()),
                None => groups.push((parent_key, vec![name.clone()])),
            }
        }

        for (parent, children) in &groups {
            let parent_amount = allocation.amount(parent);

            if parent_amount <= 0.0 {
                // Zero parent: seed from the reserve per policy. The
                // parent balance stays put; only the reserve moves.
                let seeded =
                    self.seed_policy
                        .seed(parent, children, profile.income, &mut allocation);
                for child in children {
                    out.insert(child.clone(), round2(seeded.get(child).copied().unwrap_or(0.0)));
                }
                continue;
            }

            // Funded parent: split its whole balance across the children.
            let child_weights: Option<HashMap<String, f64>> = weights.map(|w| {
                children
                    .iter()
                    .map(|c| (c.clone(), w.get(c).copied().unwrap_or(0.0)))
                    .collect()
            });
            let shares = splitter::split(parent_amount, children, child_weights.as_ref());
            for child in children {
                out.insert(child.clone(), round2(shares.get(child).copied().unwrap_or(0.0)));
            }

            // Conservation: deduct what was distributed so later reads see
            // the reduced balance, never double-counted money.
            let distributed: f64 = shares.values().sum();
            allocation.debit(parent, distributed);
            debug!(parent, distributed, remaining = allocation.amount(parent), "split parent");

            // A verbatim direct match for this parent must show the
            // post-decrement figure, not the stale copy from partitioning.
            for raw in requested {
                if raw.eq_ignore_ascii_case(parent) {
                    out.insert(raw.clone(), allocation.amount(parent));
                }
            }
        }

        // Non-zero guarantee: Emergency never ends at 0, requested or not.
        if allocation.contains(ALWAYS_FUNDED) && allocation.amount(ALWAYS_FUNDED) <= 0.0 {
            let synthetic = vec![FLOOR_CHILD.to_string()];
            let seeded =
                self.seed_policy
                    .seed(ALWAYS_FUNDED, &synthetic, profile.income, &mut allocation);
            let bump = seeded.get(FLOOR_CHILD).copied().unwrap_or(0.0);
            allocation.set(ALWAYS_FUNDED, bump);
            for raw in requested {
                if raw.eq_ignore_ascii_case(ALWAYS_FUNDED) {
                    out.insert(raw.clone(), bump);
                }
            }
        }

        Ok(out)
    }
}

fn validate(profile: &SpendingProfile) -> Result<(), EngineError> {
    if profile.age <= 0.0 || profile.age.is_nan() {
        return Err(EngineError::InvalidAge(profile.age));
    }
    if profile.income <= 0.0 || profile.income.is_nan() {
        return Err(EngineError::InvalidIncome(profile.income));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use smartspend_core::PredictorError;

    struct FixedPredictor(Prediction);

    #[async_trait]
    impl Predictor for FixedPredictor {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn predict(
            &self,
            _profile: &SpendingProfile,
        ) -> Result<Prediction, PredictorError> {
            Ok(self.0.clone())
        }
    }

    fn prediction(entries: &[(&str, f64)]) -> Prediction {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn engine() -> BudgetEngine {
        BudgetEngine::new(Arc::new(FixedPredictor(Prediction::new())))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn profile() -> SpendingProfile {
        SpendingProfile::new(30.0, 100_000.0)
    }

    #[test]
    fn rejects_nonpositive_age() {
        let err = engine()
            .assemble(&SpendingProfile::new(0.0, 50_000.0), &[], None, &Prediction::new())
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidAge(0.0));
    }

    #[test]
    fn rejects_nonpositive_income() {
        let err = engine()
            .assemble(&SpendingProfile::new(30.0, -1.0), &[], None, &Prediction::new())
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidIncome(-1.0));
    }

    #[test]
    fn empty_request_returns_full_canonical_table() {
        let pred = prediction(&[("Food", 20_000.0), ("Savings", 15_000.0)]);
        let out = engine().assemble(&profile(), &[], None, &pred).unwrap();
        assert_eq!(out["Food"], 20_000.0);
        assert_eq!(out["Savings"], 15_000.0);
        assert_eq!(out["Other"], 0.0);
        // Unchanged means unchanged: no Emergency floor on this path.
        assert_eq!(out["Emergency"], 0.0);
    }

    #[test]
    fn direct_match_is_case_insensitive() {
        let pred = prediction(&[("Food", 20_000.0), ("Emergency", 100.0)]);
        let out = engine()
            .assemble(&profile(), &names(&["food", "FOOD"]), None, &pred)
            .unwrap();
        assert_eq!(out["food"], 20_000.0);
        assert_eq!(out["FOOD"], 20_000.0);
    }

    #[test]
    fn sole_custom_child_takes_whole_parent_balance() {
        let pred = prediction(&[("Food", 20_000.0), ("Emergency", 100.0)]);
        let out = engine()
            .assemble(&profile(), &names(&["Groceries"]), None, &pred)
            .unwrap();
        assert_eq!(out["Groceries"], 20_000.0);
    }

    #[test]
    fn custom_split_conserves_parent_total() {
        let pred = prediction(&[("Food", 9000.0), ("Emergency", 100.0)]);
        let out = engine()
            .assemble(
                &profile(),
                &names(&["Groceries", "Dining", "Snacks"]),
                None,
                &pred,
            )
            .unwrap();
        let total: f64 = out.values().sum();
        assert!((total - 9000.0).abs() < 0.01);
    }

    #[test]
    fn weighted_custom_split() {
        let pred = prediction(&[("Food", 100.0), ("Emergency", 100.0)]);
        let mut weights = HashMap::new();
        weights.insert("Groceries".to_string(), 3.0);
        weights.insert("Dining".to_string(), 1.0);
        let out = engine()
            .assemble(
                &profile(),
                &names(&["Groceries", "Dining"]),
                Some(&weights),
                &pred,
            )
            .unwrap();
        assert_eq!(out["Groceries"], 75.0);
        assert_eq!(out["Dining"], 25.0);
    }

    #[test]
    fn requested_parent_shows_post_decrement_balance() {
        let pred = prediction(&[("Food", 10_000.0), ("Emergency", 100.0)]);
        let out = engine()
            .assemble(&profile(), &names(&["Food", "Groceries"]), None, &pred)
            .unwrap();
        // Groceries drained Food entirely; the verbatim "Food" entry must
        // reflect that, not the pre-split 10000.
        assert_eq!(out["Groceries"], 10_000.0);
        assert_eq!(out["Food"], 0.0);
    }

    #[test]
    fn unknown_custom_name_routes_through_other() {
        let pred = prediction(&[("Other", 1000.0), ("Emergency", 100.0)]);
        let out = engine()
            .assemble(&profile(), &names(&["llama grooming"]), None, &pred)
            .unwrap();
        assert_eq!(out["llama grooming"], 1000.0);
    }

    #[test]
    fn zero_parent_with_policy_seeds_from_reserve() {
        let pred = prediction(&[("Savings", 15_000.0), ("Emergency", 100.0)]);
        let out = engine()
            .assemble(&profile(), &names(&["Tuition"]), None, &pred)
            .unwrap();
        // Education predicted 0; 2% of 100000 seeded from Savings.
        assert_eq!(out["Tuition"], 2000.0);
    }

    #[test]
    fn zero_parent_without_policy_stays_zero() {
        let pred = prediction(&[("Savings", 15_000.0), ("Emergency", 100.0)]);
        let out = engine()
            .assemble(&profile(), &names(&["Rent"]), None, &pred)
            .unwrap();
        // Housing predicted 0 and essentials are never auto-seeded.
        assert_eq!(out["Rent"], 0.0);
        // Reserve untouched by the Housing group (Emergency was funded).
        let direct = engine()
            .assemble(&profile(), &[], None, &pred)
            .unwrap();
        assert_eq!(direct["Savings"], 15_000.0);
    }

    #[test]
    fn emergency_floor_applies_even_when_not_requested() {
        let pred = prediction(&[("Food", 20_000.0), ("Savings", 15_000.0)]);
        let eng = engine();
        let out = eng
            .assemble(&profile(), &names(&["Groceries"]), None, &pred)
            .unwrap();
        assert_eq!(out["Groceries"], 20_000.0);
        // Emergency was bumped internally; requesting it surfaces 3% of
        // income, and Savings reflects the withdrawal.
        let out2 = eng
            .assemble(
                &profile(),
                &names(&["Emergency", "Savings"]),
                None,
                &pred,
            )
            .unwrap();
        assert_eq!(out2["Emergency"], 3000.0);
        // The direct "Savings" entry is a read-only view copied before the
        // floor ran, so it still shows the pre-withdrawal figure.
        assert_eq!(out2["Savings"], 15_000.0);
    }

    #[test]
    fn spec_scenario_groceries_and_rent() {
        // age=30, income=100000, Food=20000, Savings=15000, Emergency=0.
        let pred = prediction(&[("Food", 20_000.0), ("Savings", 15_000.0), ("Emergency", 0.0)]);
        let eng = engine();
        let out = eng
            .assemble(&profile(), &names(&["Groceries", "Rent"]), None, &pred)
            .unwrap();
        // Groceries is the sole Food child: full balance.
        assert_eq!(out["Groceries"], 20_000.0);
        // Housing has no seed policy: Rent gets 0, Savings untouched by it.
        assert_eq!(out["Rent"], 0.0);
        // Emergency floor then seeds 3% of income from Savings.
        let check = eng
            .assemble(
                &profile(),
                &names(&["Emergency", "Savings", "Food"]),
                None,
                &pred,
            )
            .unwrap();
        assert_eq!(check["Emergency"], 3000.0);
        // Direct matches are copied before the floor runs.
        assert_eq!(check["Savings"], 15_000.0);
        assert_eq!(check["Food"], 20_000.0);
    }

    #[test]
    fn assemble_is_idempotent() {
        let pred = prediction(&[("Food", 20_000.0), ("Savings", 15_000.0)]);
        let eng = engine();
        let a = eng
            .assemble(&profile(), &names(&["Groceries", "Gym"]), None, &pred)
            .unwrap();
        let b = eng
            .assemble(&profile(), &names(&["Groceries", "Gym"]), None, &pred)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_names_collapse_to_one_entry() {
        let pred = prediction(&[("Food", 10_000.0), ("Emergency", 100.0)]);
        let out = engine()
            .assemble(&profile(), &names(&["Gym", "Groceries", "Groceries"]), None, &pred)
            .unwrap();
        // Two "Groceries" occurrences are two children in the Food group,
        // so each share is half the balance; the map keeps one entry.
        assert_eq!(out["Groceries"], 5000.0);
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn recommend_validates_before_calling_predictor() {
        struct PanickyPredictor;

        #[async_trait]
        impl Predictor for PanickyPredictor {
            fn name(&self) -> &str {
                "panicky"
            }

            async fn predict(
                &self,
                _profile: &SpendingProfile,
            ) -> Result<Prediction, PredictorError> {
                panic!("predictor must not be called for invalid input");
            }
        }

        let eng = BudgetEngine::new(Arc::new(PanickyPredictor));
        let err = eng
            .recommend(&SpendingProfile::new(-1.0, 100.0), &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Engine(EngineError::InvalidAge(_))));
    }

    #[tokio::test]
    async fn recommend_runs_end_to_end() {
        let pred = prediction(&[("Food", 20_000.0), ("Savings", 15_000.0)]);
        let eng = BudgetEngine::new(Arc::new(FixedPredictor(pred)));
        let out = eng
            .recommend(&profile(), &names(&["Groceries"]), None)
            .await
            .unwrap();
        assert_eq!(out["Groceries"], 20_000.0);
    }
}
