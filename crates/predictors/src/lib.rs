//! Predictor implementations for SmartSpend.
//!
//! Two backends for the [`Predictor`](smartspend_core::Predictor) trait:
//!
//! - [`HttpPredictor`] — client for a remote model service (the trained
//!   regression model behind `POST /predict`);
//! - [`BaselinePredictor`] — deterministic share-of-income table, no I/O,
//!   the default when no model service is configured and the workhorse in
//!   tests.
//!
//! [`router::build_from_config`] picks the right one from `AppConfig`.

pub mod baseline;
pub mod http;
pub mod router;

pub use baseline::BaselinePredictor;
pub use http::HttpPredictor;
pub use router::build_from_config;
