//! Configuration management for the wine prediction service

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Which backend answers prediction requests.
///
/// Resolved once at startup. When more than one remote endpoint is
/// configured, tensor-server wins over gateway, and gateway over local.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    /// Remote tensor inference server (named FP32 tensors per call)
    TensorServer,
    /// Remote JSON inference gateway (KServe-v2 REST)
    Gateway,
    /// In-process ONNX model
    Local,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the API listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Prediction backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Tensor inference server endpoint (host:port or full URL).
    /// Presence selects tensor-server mode.
    #[serde(default)]
    pub tensor_server_url: Option<String>,
    /// JSON inference gateway base URL. Presence selects gateway mode
    /// unless a tensor server is also configured.
    #[serde(default)]
    pub gateway_url: Option<String>,
    /// Path to the exported ONNX regression model for local mode
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Ensemble pipeline name on the tensor server
    #[serde(default = "default_ensemble_target")]
    pub ensemble_target: String,
    /// Model name in the gateway infer path
    #[serde(default = "default_gateway_model")]
    pub gateway_model: String,
    /// Connect timeout for remote backends (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// End-to-end request timeout for remote backends (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Number of intra-op threads for local ONNX inference
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Interval between periodic metrics summaries (seconds)
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_model_path() -> String {
    "models/wine_model/model.onnx".to_string()
}

fn default_ensemble_target() -> String {
    "ensemble_model".to_string()
}

fn default_gateway_model() -> String {
    "ensemble-model".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_onnx_threads() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_report_interval_secs() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from the default file location plus environment.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific file path plus environment.
    ///
    /// The file is optional; environment variables with the `WINE__` prefix
    /// (double-underscore section separator) override file values, e.g.
    /// `WINE__BACKEND__TENSOR_SERVER_URL=triton:8000`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("WINE").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl BackendConfig {
    /// Resolve the backend mode from the configured endpoint strings.
    ///
    /// Checked in fixed precedence order: tensor-server, gateway, local.
    pub fn routing_mode(&self) -> RoutingMode {
        if is_configured(&self.tensor_server_url) {
            RoutingMode::TensorServer
        } else if is_configured(&self.gateway_url) {
            RoutingMode::Gateway
        } else {
            RoutingMode::Local
        }
    }
}

fn is_configured(endpoint: &Option<String>) -> bool {
    endpoint
        .as_deref()
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            tensor_server_url: None,
            gateway_url: None,
            model_path: default_model_path(),
            ensemble_target: default_ensemble_target(),
            gateway_model: default_gateway_model(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            onnx_threads: default_onnx_threads(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: default_report_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.backend.ensemble_target, "ensemble_model");
        assert_eq!(config.backend.gateway_model, "ensemble-model");
        assert_eq!(config.backend.routing_mode(), RoutingMode::Local);
    }

    #[test]
    fn test_tensor_server_takes_precedence() {
        let backend = BackendConfig {
            tensor_server_url: Some("triton:8000".to_string()),
            gateway_url: Some("http://gateway:8000".to_string()),
            ..BackendConfig::default()
        };
        assert_eq!(backend.routing_mode(), RoutingMode::TensorServer);
    }

    #[test]
    fn test_gateway_beats_local() {
        let backend = BackendConfig {
            gateway_url: Some("http://gateway:8000".to_string()),
            ..BackendConfig::default()
        };
        assert_eq!(backend.routing_mode(), RoutingMode::Gateway);
    }

    #[test]
    fn test_blank_endpoint_is_not_configured() {
        let backend = BackendConfig {
            tensor_server_url: Some("   ".to_string()),
            gateway_url: Some(String::new()),
            ..BackendConfig::default()
        };
        assert_eq!(backend.routing_mode(), RoutingMode::Local);
    }
}
