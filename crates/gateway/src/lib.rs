//! HTTP API gateway for SmartSpend.
//!
//! Exposes the recommendation engine over REST:
//!
//! - `POST /recommend`  — allocate a monthly income across categories
//! - `GET  /health`     — service + predictor health, canonical list
//! - `GET  /categories` — canonical categories and resolver table size
//!
//! Built on Axum. The engine holds no per-request state, so the shared
//! state is a plain `Arc` with no locks; request isolation is a property
//! of the engine itself.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::{self, Next},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use smartspend_config::AppConfig;
use smartspend_core::{Employment, Error, Predictor, SpendingProfile};
use smartspend_engine::{BudgetEngine, KeywordRule, KeywordTable, SeedPolicy};

/// Maximum request body size — recommendation payloads are tiny.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: BudgetEngine,
    pub config: AppConfig,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<GatewayState>;

/// Build an engine from configuration tables.
///
/// Empty config sections keep the engine's documented defaults; keyword
/// overrides are prepended so they outrank the built-in rules.
pub fn build_engine(config: &AppConfig, predictor: Arc<dyn Predictor>) -> BudgetEngine {
    let mut engine = BudgetEngine::new(predictor);

    if !config.engine.canonical.is_empty() {
        engine = engine.with_canonical(config.engine.canonical.clone());
    }
    if !config.engine.seed_policy.is_empty() {
        engine = engine.with_seed_policy(SeedPolicy::new(config.engine.seed_policy.clone()));
    }
    if !config.engine.keywords.is_empty() {
        let overrides = config
            .engine
            .keywords
            .iter()
            .map(|r| KeywordRule::new(r.pattern.clone(), r.parent.clone()))
            .collect();
        engine = engine.with_keywords(KeywordTable::default().with_overrides(overrides));
    }

    engine
}

/// Build the Axum router with all gateway routes and layers.
pub fn build_router(state: SharedState) -> Router {
    // CORS: same-origin by default; explicit origins can be configured.
    let cors = if state.config.gateway.allowed_origins.is_empty() {
        CorsLayer::new()
    } else {
        let origins: Vec<axum::http::HeaderValue> = state
            .config
            .gateway
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    };

    // Rate limiter state: shared across all requests.
    let rate_limiter = Arc::new(RateLimiter::new(120, std::time::Duration::from_secs(60)));

    Router::new()
        .route("/health", get(health_handler))
        .route("/categories", get(categories_handler))
        .route("/recommend", post(recommend_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            rate_limit_middleware(limiter, req, next)
        }))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let predictor = smartspend_predictors::build_from_config(&config);
    let engine = build_engine(&config, predictor);

    let state = Arc::new(GatewayState {
        engine,
        config,
        start_time: chrono::Utc::now(),
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Rate Limiter ---

/// Simple in-memory sliding-window rate limiter.
///
/// Tracks request timestamps per client key. Thread-safe via
/// `std::sync::Mutex` (non-async, held briefly).
struct RateLimiter {
    max_requests: usize,
    window: std::time::Duration,
    clients: std::sync::Mutex<HashMap<String, Vec<std::time::Instant>>>,
}

impl RateLimiter {
    fn new(max_requests: usize, window: std::time::Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Check if the client is within rate limits. Returns `true` if allowed.
    fn check(&self, client_key: &str) -> bool {
        let now = std::time::Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        // Evict stale entries if the map grows too large.
        if clients.len() > 10_000 {
            clients.retain(|_, timestamps| {
                timestamps
                    .last()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let timestamps = clients.entry(client_key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Rate limiting middleware — keys on the client IP header if present,
/// "anonymous" otherwise. The /health endpoint is exempt so monitoring can
/// poll it freely.
async fn rate_limit_middleware(
    limiter: Arc<RateLimiter>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    if req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }

    let client_key = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    if !limiter.check(&client_key) {
        warn!(client = %client_key.chars().take(40).collect::<String>(), "Rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(req).await)
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct RecommendRequest {
    age: f64,
    income: f64,
    #[serde(default)]
    employment: Option<Employment>,
    /// Category names to allocate for; empty = all canonical buckets.
    #[serde(default)]
    categories: Vec<String>,
    /// Optional per-category weights biasing proportional splits.
    #[serde(default)]
    weights: Option<HashMap<String, f64>>,
}

#[derive(Serialize)]
struct RecommendResponse {
    recommendation: HashMap<String, f64>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    predictor: String,
    predictor_healthy: bool,
    canonical: Vec<String>,
    uptime_secs: i64,
}

#[derive(Serialize)]
struct CategoriesResponse {
    canonical: Vec<String>,
    keyword_rules: usize,
}

// --- Handlers ---

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let predictor = state.engine.predictor();
    let predictor_healthy = predictor.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: if predictor_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        predictor: predictor.name().to_string(),
        predictor_healthy,
        canonical: state.engine.canonical().to_vec(),
        uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
    })
}

async fn categories_handler(State(state): State<SharedState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        canonical: state.engine.canonical().to_vec(),
        keyword_rules: state.engine.keywords().len(),
    })
}

async fn recommend_handler(
    State(state): State<SharedState>,
    Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request_id = uuid::Uuid::new_v4();
    info!(
        %request_id,
        categories = payload.categories.len(),
        weighted = payload.weights.is_some(),
        "recommend request"
    );

    let profile = SpendingProfile {
        age: payload.age,
        income: payload.income,
        employment: payload.employment,
    };

    match state
        .engine
        .recommend(&profile, &payload.categories, payload.weights.as_ref())
        .await
    {
        Ok(recommendation) => Ok(Json(RecommendResponse { recommendation })),
        Err(e) => {
            warn!(%request_id, error = %e, "recommend request failed");
            Err(error_response(e))
        }
    }
}

fn error_response(e: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        Error::Engine(_) => StatusCode::BAD_REQUEST,
        Error::Predictor(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}
