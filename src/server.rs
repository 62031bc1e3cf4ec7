//! HTTP API for the prediction service.
//!
//! Thin axum layer over the router: schema validation happens in the JSON
//! extractor and the feature validator, so malformed requests never reach
//! a backend.

use crate::config::ServerConfig;
use crate::error::PredictError;
use crate::metrics::RequestMetrics;
use crate::router::PredictionRouter;
use crate::types::{PredictionResponse, WineFeatures};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::info;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Prediction router, immutable after startup
    pub router: Arc<PredictionRouter>,
    /// Request metrics collector
    pub metrics: Arc<RequestMetrics>,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = match self {
            PredictError::InvalidFeatures(_) => StatusCode::BAD_REQUEST,
            PredictError::ModelNotLoaded
            | PredictError::Transport { .. }
            | PredictError::Inference { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state)
}

/// Bind and serve the API until the process exits.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .context(format!("Failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "Prediction API listening");

    axum::serve(listener, app)
        .await
        .context("HTTP server error")
}

/// Service banner with the active backend mode.
async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "Wine Quality Prediction API",
        "mode": state.router.mode_label(),
    }))
}

/// Liveness probe.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "mode": state.router.mode_label(),
    }))
}

/// Score one wine sample.
async fn predict(
    State(state): State<AppState>,
    Json(features): Json<WineFeatures>,
) -> Result<Json<PredictionResponse>, PredictError> {
    let start = Instant::now();

    match state.router.predict(&features).await {
        Ok(prediction) => {
            state.metrics.record_prediction(start.elapsed());
            Ok(Json(PredictionResponse { prediction }))
        }
        Err(e) => {
            let backend = e
                .backend()
                .map(|b| b.to_string())
                .unwrap_or_else(|| "none".to_string());
            state.metrics.record_failure(&backend);
            Err(e)
        }
    }
}
