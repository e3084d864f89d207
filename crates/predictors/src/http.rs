//! HTTP predictor — client for a remote model service.
//!
//! The model service wraps the trained regression model and exposes:
//! - `POST /predict` with `{age, income, employment?}` returning
//!   `{"prediction": {category: amount}}`;
//! - `GET /health` returning `{"ok": true, ...}`.
//!
//! Amounts come back as the model produced them; clamping negatives and
//! filling missing categories is the engine's job, not ours.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use smartspend_core::{Employment, Prediction, Predictor, PredictorError, SpendingProfile};
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Client for a remote prediction service.
pub struct HttpPredictor {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpPredictor {
    /// Create a predictor pointing at `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a predictor with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "http".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn map_error(e: reqwest::Error) -> PredictorError {
        if e.is_timeout() {
            PredictorError::Timeout(e.to_string())
        } else if e.is_decode() {
            PredictorError::MalformedResponse(e.to_string())
        } else {
            PredictorError::Network(e.to_string())
        }
    }
}

// --- Wire types -----------------------------------------------------------

#[derive(Serialize)]
struct PredictRequest {
    age: f64,
    income: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    employment: Option<Employment>,
}

#[derive(Deserialize)]
struct PredictResponse {
    prediction: HashMap<String, f64>,
}

#[derive(Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

#[async_trait]
impl Predictor for HttpPredictor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn predict(&self, profile: &SpendingProfile) -> Result<Prediction, PredictorError> {
        let url = format!("{}/predict", self.base_url);
        let body = PredictRequest {
            age: profile.age,
            income: profile.income,
            employment: profile.employment,
        };

        debug!(url = %url, "requesting prediction");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "model service returned an error");
            return Err(PredictorError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| PredictorError::MalformedResponse(e.to_string()))?;

        if parsed.prediction.is_empty() {
            return Err(PredictorError::MalformedResponse(
                "prediction map is empty".into(),
            ));
        }

        Ok(parsed.prediction)
    }

    async fn health_check(&self) -> Result<bool, PredictorError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_error)?;

        if !response.status().is_success() {
            return Ok(false);
        }

        let parsed: HealthResponse = response
            .json()
            .await
            .map_err(|e| PredictorError::MalformedResponse(e.to_string()))?;
        Ok(parsed.ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let p = HttpPredictor::new("http://localhost:5050/");
        assert_eq!(p.base_url, "http://localhost:5050");
    }

    #[test]
    fn predict_request_omits_missing_employment() {
        let req = PredictRequest {
            age: 30.0,
            income: 100_000.0,
            employment: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("employment"));
    }

    #[test]
    fn predict_request_includes_employment_when_set() {
        let req = PredictRequest {
            age: 30.0,
            income: 100_000.0,
            employment: Some(Employment::Student),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"employment\":\"student\""));
    }

    #[test]
    fn predict_response_parses_amount_map() {
        let json = r#"{"prediction": {"Food": 20000.0, "Savings": 15000.0}}"#;
        let parsed: PredictResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.prediction["Food"], 20_000.0);
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let p = HttpPredictor::with_timeout("http://127.0.0.1:1", Duration::from_millis(200));
        let err = p
            .predict(&SpendingProfile::new(30.0, 100_000.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PredictorError::Network(_) | PredictorError::Timeout(_)
        ));
    }
}
