//! Prediction routing core.
//!
//! The router owns the single backend resolved at startup, validates the
//! incoming feature vector, and dispatches. It holds no mutable state and
//! is shared behind an `Arc` by every request handler.

use crate::backend::Backend;
use crate::config::BackendConfig;
use crate::error::{BackendKind, PredictError};
use crate::types::WineFeatures;
use tracing::warn;

/// Routes prediction requests to the configured backend.
pub struct PredictionRouter {
    backend: Backend,
}

impl PredictionRouter {
    /// Wrap an already-resolved backend.
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Resolve the backend from configuration and build the router.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(Backend::resolve(config))
    }

    /// The active backend kind, if any backend is available.
    pub fn mode(&self) -> Option<BackendKind> {
        self.backend.kind()
    }

    /// Human-readable mode label for the service banner.
    pub fn mode_label(&self) -> &'static str {
        match self.backend.kind() {
            Some(BackendKind::TensorServer) => "tensor-server",
            Some(BackendKind::Gateway) => "gateway",
            Some(BackendKind::Local) => "local",
            None => "unavailable",
        }
    }

    /// Validate and score one feature vector.
    pub async fn predict(&self, features: &WineFeatures) -> Result<f64, PredictError> {
        features.validate()?;

        match self.backend.predict(features).await {
            Ok(prediction) => Ok(prediction),
            Err(e) => {
                warn!(backend = %self.mode_label(), error = %e, "Prediction failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_features() -> WineFeatures {
        WineFeatures {
            alcohol: 13.2,
            malic_acid: 1.78,
            ash: 2.14,
            alcalinity_of_ash: 11.2,
            magnesium: 100.0,
            total_phenols: 2.65,
            flavanoids: 2.76,
            nonflavanoid_phenols: 0.26,
            proanthocyanins: 1.28,
            color_intensity: 4.38,
            hue: 1.05,
            od280_od315_of_diluted_wines: 3.4,
            proline: 1050.0,
        }
    }

    #[tokio::test]
    async fn test_unavailable_backend_reports_not_loaded() {
        let router = PredictionRouter::new(Backend::Unavailable);

        let err = router.predict(&sample_features()).await.unwrap_err();
        assert!(matches!(err, PredictError::ModelNotLoaded));
        assert_eq!(err.to_string(), "Model not loaded");
        assert_eq!(router.mode_label(), "unavailable");
    }

    #[tokio::test]
    async fn test_validation_runs_before_backend() {
        // Even with no backend, a bad vector must fail validation first
        let router = PredictionRouter::new(Backend::Unavailable);

        let mut features = sample_features();
        features.proline = f64::NAN;

        let err = router.predict(&features).await.unwrap_err();
        assert!(matches!(err, PredictError::InvalidFeatures(_)));
    }

    #[tokio::test]
    async fn test_mode_labels() {
        let config = BackendConfig {
            tensor_server_url: Some("triton:8000".to_string()),
            ..BackendConfig::default()
        };
        let router = PredictionRouter::from_config(&config);
        assert_eq!(router.mode_label(), "tensor-server");
        assert_eq!(router.mode(), Some(BackendKind::TensorServer));

        let config = BackendConfig {
            gateway_url: Some("http://gateway:8000".to_string()),
            ..BackendConfig::default()
        };
        let router = PredictionRouter::from_config(&config);
        assert_eq!(router.mode_label(), "gateway");
    }
}
