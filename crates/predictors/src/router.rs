//! Predictor selection — builds the right backend from config.

use std::sync::Arc;
use std::time::Duration;

use smartspend_config::AppConfig;
use smartspend_core::Predictor;
use tracing::info;

use crate::baseline::BaselinePredictor;
use crate::http::HttpPredictor;

/// Build a predictor from configuration.
///
/// `kind = "http"` requires a URL (config validation enforces this);
/// anything else falls back to the built-in baseline table.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Predictor> {
    match (config.predictor.kind.as_str(), &config.predictor.url) {
        ("http", Some(url)) => {
            info!(url = %url, "using HTTP model service predictor");
            Arc::new(HttpPredictor::with_timeout(
                url,
                Duration::from_secs(config.predictor.timeout_secs),
            ))
        }
        _ => {
            info!("using built-in baseline predictor");
            Arc::new(BaselinePredictor::new())
        }
    }
}
