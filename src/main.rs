//! Wine Prediction Service - Main Entry Point
//!
//! Resolves the prediction backend once at startup (tensor-server, then
//! gateway, then local model) and serves predictions over HTTP.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use wine_prediction_service::{
    config::AppConfig,
    metrics::{MetricsReporter, RequestMetrics},
    router::PredictionRouter,
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "wine_prediction_service={}",
            config.logging.level
        ))
    });
    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Wine Prediction Service");

    // Initialize metrics
    let metrics = Arc::new(RequestMetrics::new());

    // Resolve the backend once; the router is immutable from here on
    let router = Arc::new(PredictionRouter::from_config(&config.backend));
    info!(mode = %router.mode_label(), "Prediction router initialized");

    // Start metrics reporter
    let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
    tokio::spawn(async move {
        reporter.start().await;
    });

    // Serve the API
    let state = AppState { router, metrics };
    server::serve(&config.server, state).await
}
