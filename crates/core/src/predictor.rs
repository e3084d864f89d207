//! Predictor trait — the abstraction over the regression model.
//!
//! A Predictor turns a [`SpendingProfile`] into a per-canonical-category
//! amount map. The allocation engine calls `predict()` exactly once per
//! request without knowing which backend produced the numbers.
//!
//! Implementations: HTTP model service, deterministic baseline, stubs in
//! tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::PredictorError;
use crate::profile::SpendingProfile;

/// Raw model output: canonical category name → predicted monthly amount.
///
/// Amounts may be negative or missing categories — the engine clamps and
/// fills defensively when it builds its allocation table.
pub type Prediction = HashMap<String, f64>;

/// The core Predictor trait.
///
/// Every model backend implements this. Implementations must be safe to
/// share behind an `Arc` across concurrent requests: `predict` takes
/// `&self` and all mutable request state lives in the caller.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// A human-readable name for this predictor (e.g., "http", "baseline").
    fn name(&self) -> &str;

    /// Produce a per-canonical-category amount map for this profile.
    async fn predict(&self, profile: &SpendingProfile) -> Result<Prediction, PredictorError>;

    /// Health check — can we reach the model?
    async fn health_check(&self) -> Result<bool, PredictorError> {
        Ok(true)
    }
}
