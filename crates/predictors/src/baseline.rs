//! Baseline predictor — deterministic share-of-income table.
//!
//! A stand-in for the trained regression model: each canonical category
//! gets a fixed share of monthly income, nudged by coarse age bands. No
//! network, no model artifact, fully reproducible — the default backend
//! when no model service is configured, and the workhorse in tests.
//!
//! Emergency is deliberately left at 0 here: the engine's floor guarantee
//! funds it from the reserve, which keeps that code path exercised on the
//! default stack.

use async_trait::async_trait;
use smartspend_core::{Prediction, Predictor, PredictorError, SpendingProfile};

/// Base share of monthly income per canonical category.
const BASE_SHARES: &[(&str, f64)] = &[
    ("Food", 0.20),
    ("Transport", 0.10),
    ("Housing", 0.25),
    ("Utilities", 0.07),
    ("Entertainment", 0.05),
    ("Savings", 0.15),
    ("Healthcare", 0.05),
    ("Education", 0.03),
    ("Emergency", 0.0),
    ("Other", 0.02),
];

/// Deterministic rule-of-thumb predictor.
pub struct BaselinePredictor {
    name: String,
}

impl BaselinePredictor {
    pub fn new() -> Self {
        Self {
            name: "baseline".into(),
        }
    }

    /// Age-band adjustment added to a category's base share.
    fn age_adjustment(age: f64, category: &str) -> f64 {
        if age < 25.0 {
            match category {
                "Education" => 0.02,
                "Savings" => -0.02,
                _ => 0.0,
            }
        } else if age >= 55.0 {
            match category {
                "Healthcare" => 0.03,
                "Education" => -0.02,
                "Transport" => -0.01,
                _ => 0.0,
            }
        } else {
            0.0
        }
    }
}

impl Default for BaselinePredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Predictor for BaselinePredictor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn predict(&self, profile: &SpendingProfile) -> Result<Prediction, PredictorError> {
        let mut prediction = Prediction::with_capacity(BASE_SHARES.len());
        for (category, share) in BASE_SHARES {
            let adjusted = (share + Self::age_adjustment(profile.age, category)).max(0.0);
            prediction.insert(category.to_string(), profile.income * adjusted);
        }
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn predict(age: f64, income: f64) -> Prediction {
        let p = BaselinePredictor::new();
        p.predict(&SpendingProfile::new(age, income)).await.unwrap()
    }

    #[tokio::test]
    async fn shares_scale_with_income() {
        let out = predict(30.0, 100_000.0).await;
        assert_eq!(out["Food"], 20_000.0);
        assert_eq!(out["Savings"], 15_000.0);
        assert_eq!(out["Housing"], 25_000.0);
    }

    #[tokio::test]
    async fn emergency_is_left_to_the_engine_floor() {
        let out = predict(30.0, 100_000.0).await;
        assert_eq!(out["Emergency"], 0.0);
    }

    #[tokio::test]
    async fn young_profiles_shift_savings_toward_education() {
        let out = predict(20.0, 100_000.0).await;
        assert_eq!(out["Education"], 5000.0);
        assert_eq!(out["Savings"], 13_000.0);
    }

    #[tokio::test]
    async fn older_profiles_spend_more_on_healthcare() {
        let out = predict(60.0, 100_000.0).await;
        assert_eq!(out["Healthcare"], 8000.0);
        assert_eq!(out["Education"], 1000.0);
    }

    #[tokio::test]
    async fn deterministic_for_identical_profiles() {
        let a = predict(40.0, 80_000.0).await;
        let b = predict(40.0, 80_000.0).await;
        assert_eq!(a, b);
    }
}
