//! JSON inference gateway client.
//!
//! Posts a fixed-schema JSON body to `<base>/v2/models/<model>/infer`.
//! Unlike the tensor-server codec this one nests each value as a one-row
//! matrix (`data: [[v]]`) and reads the result positionally: the first
//! element of the first output entry's data array.

use crate::config::BackendConfig;
use crate::error::{BackendKind, PredictError};
use crate::types::WineFeatures;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for a remote JSON inference gateway.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
    model: String,
}

/// One named input entry with explicit shape and type tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayInput {
    pub name: String,
    pub shape: Vec<i64>,
    pub datatype: String,
    pub data: Vec<Vec<f32>>,
}

/// A requested output entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayRequestedOutput {
    pub name: String,
}

/// Gateway request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayRequest {
    pub inputs: Vec<GatewayInput>,
    pub outputs: Vec<GatewayRequestedOutput>,
}

/// One output entry in the gateway response.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOutput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Vec<f64>,
}

/// Gateway response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayResponse {
    #[serde(default)]
    pub outputs: Vec<GatewayOutput>,
}

impl GatewayClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: &str, config: &BackendConfig) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            model: config.gateway_model.clone(),
        }
    }

    /// Run one inference call and extract the scalar prediction.
    pub async fn infer(&self, features: &WineFeatures) -> Result<f64, PredictError> {
        let request = build_request(features);
        let url = format!("{}/v2/models/{}/infer", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PredictError::Transport {
                backend: BackendKind::Gateway,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictError::Inference {
                backend: BackendKind::Gateway,
                message: format!("status {}: {}", status, body),
            });
        }

        let parsed: GatewayResponse =
            response.json().await.map_err(|e| PredictError::Inference {
                backend: BackendKind::Gateway,
                message: format!("invalid response body: {}", e),
            })?;

        let prediction = extract_prediction(&parsed)?;
        debug!(prediction = prediction, model = %self.model, "Gateway inference complete");
        Ok(prediction)
    }
}

/// Encode the feature vector as named [1, 1] entries with nested data.
fn build_request(features: &WineFeatures) -> GatewayRequest {
    let inputs = features
        .named_values()
        .iter()
        .map(|(name, value)| GatewayInput {
            name: name.to_string(),
            shape: vec![1, 1],
            datatype: "FP32".to_string(),
            data: vec![vec![*value as f32]],
        })
        .collect();

    GatewayRequest {
        inputs,
        outputs: vec![GatewayRequestedOutput {
            name: "prediction".to_string(),
        }],
    }
}

/// First element of the first output entry's data array.
fn extract_prediction(response: &GatewayResponse) -> Result<f64, PredictError> {
    response
        .outputs
        .first()
        .and_then(|output| output.data.first())
        .copied()
        .ok_or_else(|| PredictError::Inference {
            backend: BackendKind::Gateway,
            message: "response has no output data".to_string(),
        })
}
