//! # SmartSpend Core
//!
//! Domain types, traits, and error definitions for the SmartSpend budget
//! recommendation service. This crate has **zero framework dependencies** —
//! it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The regression model that turns (age, income) into a per-category
//! allocation is an external collaborator. It lives behind the [`Predictor`]
//! trait here; implementations live in `smartspend-predictors`. The budget
//! allocation engine in `smartspend-engine` depends only on this crate, so
//! it can be tested against stub predictors with no network in sight.

pub mod allocation;
pub mod error;
pub mod predictor;
pub mod profile;

// Re-export key types at crate root for ergonomics
pub use allocation::{
    CanonicalAllocation, round2, ALWAYS_FUNDED, DEFAULT_CANONICAL, FALLBACK_CATEGORY,
    RESERVE_CATEGORY,
};
pub use error::{EngineError, Error, PredictorError, Result};
pub use predictor::{Prediction, Predictor};
pub use profile::{Employment, SpendingProfile};
