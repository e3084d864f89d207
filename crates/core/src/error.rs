//! Error types for the SmartSpend domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all SmartSpend operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Engine errors ---
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    // --- Predictor errors ---
    #[error("Predictor error: {0}")]
    Predictor(#[from] PredictorError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Input-validation failures from the allocation engine.
///
/// These are the only errors the engine itself produces: an unresolvable
/// category name falls back to "Other" and an exhausted reserve seeds
/// zeros, neither of which is an error by design.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("age must be greater than zero (got {0})")]
    InvalidAge(f64),

    #[error("income must be greater than zero (got {0})")]
    InvalidIncome(f64),
}

/// Failures talking to the regression model behind the [`Predictor`] trait.
///
/// The engine never sees these: the calling layer translates them into an
/// error response before any allocation work starts.
///
/// [`Predictor`]: crate::predictor::Predictor
#[derive(Debug, Clone, Error)]
pub enum PredictorError {
    #[error("model service request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("model service returned a malformed prediction: {0}")]
    MalformedResponse(String),

    #[error("predictor not configured: {0}")]
    NotConfigured(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),
}
