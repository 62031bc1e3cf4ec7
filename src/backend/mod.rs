//! Prediction backends.
//!
//! Exactly one backend is resolved at startup from configuration and held
//! immutably for the life of the process. Precedence when several are
//! configured: tensor-server, then gateway, then local.

pub mod gateway;
pub mod local;
pub mod tensor;

use crate::config::{BackendConfig, RoutingMode};
use crate::error::{BackendKind, PredictError};
use crate::types::WineFeatures;
use tracing::{error, info};

pub use gateway::GatewayClient;
pub use local::LocalModel;
pub use tensor::TensorServerClient;

/// The resolved prediction backend.
pub enum Backend {
    /// Remote tensor inference server
    TensorServer(TensorServerClient),
    /// Remote JSON inference gateway
    Gateway(GatewayClient),
    /// In-process ONNX model
    Local(LocalModel),
    /// Local mode was selected but the model failed to load; the service
    /// keeps serving and every prediction fails with "model not loaded"
    Unavailable,
}

impl Backend {
    /// Resolve the backend from configuration, once, at startup.
    pub fn resolve(config: &BackendConfig) -> Self {
        match config.routing_mode() {
            RoutingMode::TensorServer => {
                // routing_mode() only selects this when the URL is set
                let url = config.tensor_server_url.as_deref().unwrap_or_default();
                info!(target_model = %config.ensemble_target, "Proxying predictions to tensor server");
                Backend::TensorServer(TensorServerClient::new(url, config))
            }
            RoutingMode::Gateway => {
                let url = config.gateway_url.as_deref().unwrap_or_default();
                info!(target_model = %config.gateway_model, "Proxying predictions to inference gateway");
                Backend::Gateway(GatewayClient::new(url, config))
            }
            RoutingMode::Local => match LocalModel::load(config) {
                Ok(model) => {
                    info!(path = %config.model_path, "Serving predictions from local model");
                    Backend::Local(model)
                }
                Err(e) => {
                    error!(path = %config.model_path, error = %e, "Failed to load local model");
                    Backend::Unavailable
                }
            },
        }
    }

    /// Which backend kind this is, for logging and the service banner.
    pub fn kind(&self) -> Option<BackendKind> {
        match self {
            Backend::TensorServer(_) => Some(BackendKind::TensorServer),
            Backend::Gateway(_) => Some(BackendKind::Gateway),
            Backend::Local(_) => Some(BackendKind::Local),
            Backend::Unavailable => None,
        }
    }

    /// Produce a scalar prediction for a validated feature vector.
    pub async fn predict(&self, features: &WineFeatures) -> Result<f64, PredictError> {
        match self {
            Backend::TensorServer(client) => client.infer(features).await,
            Backend::Gateway(client) => client.infer(features).await,
            Backend::Local(model) => model.predict(features),
            Backend::Unavailable => Err(PredictError::ModelNotLoaded),
        }
    }
}
