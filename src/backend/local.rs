//! Local in-process inference against the exported ONNX model

use crate::config::BackendConfig;
use crate::error::{BackendKind, PredictError};
use crate::models::{LoadedModel, ModelLoader};
use crate::types::WineFeatures;
use anyhow::{Context, Result};
use ort::value::Tensor;
use std::sync::RwLock;
use tracing::debug;

/// Locally loaded regression model.
///
/// The session is behind a lock because ONNX Runtime requires exclusive
/// access per run; the model itself is never replaced after startup.
pub struct LocalModel {
    model: RwLock<LoadedModel>,
}

impl LocalModel {
    /// Load the model described by the backend configuration.
    pub fn load(config: &BackendConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.onnx_threads)?;
        let model = loader.load_model(&config.model_path)?;
        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Predict on a single sample.
    ///
    /// Features are reordered into the training column order (including
    /// the od280/od315 rename) before the session runs, so the caller's
    /// field order never matters.
    pub fn predict(&self, features: &WineFeatures) -> Result<f64, PredictError> {
        let input = features.to_model_input();

        let prediction = self
            .run_session(input)
            .map_err(|e| PredictError::Inference {
                backend: BackendKind::Local,
                message: e.to_string(),
            })?;

        debug!(prediction = prediction, "Local inference complete");
        Ok(prediction)
    }

    fn run_session(&self, input: Vec<f32>) -> Result<f64> {
        // Single-row batch: shape [1, 13]
        let shape = vec![1_i64, input.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, input)).context("Failed to create input tensor")?;

        let mut model = self
            .model
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let input_name = model.input_name.clone();
        let output_name = model.output_name.clone();

        let outputs = model
            .session
            .run(ort::inputs![input_name.as_str() => input_tensor])?;

        let output = outputs
            .get(&output_name)
            .context("Model output missing from session results")?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .context("Model output is not an FP32 tensor")?;

        let value = data
            .first()
            .copied()
            .context("Model output tensor is empty")?;

        Ok(value as f64)
    }
}
