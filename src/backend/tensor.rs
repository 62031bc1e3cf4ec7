//! Tensor inference server client.
//!
//! Speaks the KServe v2 inference protocol over HTTP the way the Triton
//! client SDK does: each of the 13 features travels as an individually
//! named FP32 tensor of shape [1, 1] with flat row-major data, addressed
//! to a named ensemble pipeline, requesting the single `prediction`
//! output tensor.

use crate::config::BackendConfig;
use crate::error::{BackendKind, PredictError};
use crate::types::WineFeatures;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Name of the output tensor requested from the ensemble.
const OUTPUT_NAME: &str = "prediction";

/// Client for a remote tensor inference server.
#[derive(Clone)]
pub struct TensorServerClient {
    http: Client,
    base_url: String,
    model: String,
}

/// One named input tensor, flat row-major data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferInput {
    pub name: String,
    pub shape: Vec<i64>,
    pub datatype: String,
    pub data: Vec<f32>,
}

/// A requested output tensor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferRequestedOutput {
    pub name: String,
}

/// Inference request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferRequest {
    pub inputs: Vec<InferInput>,
    pub outputs: Vec<InferRequestedOutput>,
}

/// One output tensor in the response.
#[derive(Debug, Clone, Deserialize)]
pub struct InferOutput {
    pub name: String,
    #[serde(default)]
    pub shape: Vec<i64>,
    #[serde(default)]
    pub data: Vec<f32>,
}

/// Inference response body.
#[derive(Debug, Clone, Deserialize)]
pub struct InferResponse {
    #[serde(default)]
    pub outputs: Vec<InferOutput>,
}

impl TensorServerClient {
    /// Create a client for the given endpoint.
    ///
    /// Endpoints may be bare `host:port` (the Triton convention); a
    /// missing scheme defaults to http.
    pub fn new(endpoint: &str, config: &BackendConfig) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: normalize_endpoint(endpoint),
            model: config.ensemble_target.clone(),
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
                backend: BackendKind::TensorServer,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictError::Inference {
                backend: BackendKind::TensorServer,
                message: format!("status {}: {}", status, body),
            });
        }

        let parsed: InferResponse =
            response.json().await.map_err(|e| PredictError::Inference {
                backend: BackendKind::TensorServer,
                message: format!("invalid response body: {}", e),
            })?;

        let prediction = extract_prediction(&parsed)?;
        debug!(prediction = prediction, model = %self.model, "Tensor server inference complete");
        Ok(prediction)
    }
}

/// Encode the feature vector as 13 named [1, 1] FP32 tensors.
fn build_request(features: &WineFeatures) -> InferRequest {
    let inputs = features
        .named_values()
        .iter()
        .map(|(name, value)| InferInput {
            name: name.to_string(),
            shape: vec![1, 1],
            datatype: "FP32".to_string(),
            data: vec![*value as f32],
        })
        .collect();

    InferRequest {
        inputs,
        outputs: vec![InferRequestedOutput {
            name: OUTPUT_NAME.to_string(),
        }],
    }
}

/// Find the requested output tensor by name and take its single scalar.
fn extract_prediction(response: &InferResponse) -> Result<f64, PredictError> {
    let output = response
        .outputs
        .iter()
        .find(|o| o.name == OUTPUT_NAME)
        .ok_or_else(|| PredictError::Inference {
            backend: BackendKind::TensorServer,
            message: format!("response has no '{}' output tensor", OUTPUT_NAME),
        })?;

    output
        .data
        .first()
        .copied()
        .map(f64::from)
        .ok_or_else(|| PredictError::Inference {
            backend: BackendKind::TensorServer,
            message: "prediction tensor is empty".to_string(),
        })
}

fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
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

    #[test]
    fn test_request_has_thirteen_named_tensors() {
        let request = build_request(&sample_features());

        assert_eq!(request.inputs.len(), 13);
        for input in &request.inputs {
            assert_eq!(input.shape, vec![1, 1]);
            assert_eq!(input.datatype, "FP32");
            assert_eq!(input.data.len(), 1);
        }

        assert_eq!(request.inputs[0].name, "alcohol");
        assert_eq!(request.inputs[0].data, vec![13.2_f32]);
        // The wire name keeps the underscore form
        assert_eq!(request.inputs[11].name, "od280_od315_of_diluted_wines");

        assert_eq!(request.outputs.len(), 1);
        assert_eq!(request.outputs[0].name, "prediction");
    }

    #[test]
    fn test_request_serializes_to_kserve_shape() {
        let request = build_request(&sample_features());
        let json = serde_json::to_value(&request).unwrap();

        let first = &json["inputs"][0];
        assert_eq!(first["name"], "alcohol");
        assert_eq!(first["shape"], serde_json::json!([1, 1]));
        assert_eq!(first["datatype"], "FP32");
        assert_eq!(json["outputs"][0]["name"], "prediction");
    }

    #[test]
    fn test_extract_prediction_by_name() {
        let response: InferResponse = serde_json::from_str(
            r#"{"outputs":[
                {"name":"other","shape":[1],"data":[9.0]},
                {"name":"prediction","shape":[1,1],"datatype":"FP32","data":[0.12]}
            ]}"#,
        )
        .unwrap();

        let value = extract_prediction(&response).unwrap();
        assert!((value - 0.12).abs() < 1e-6);
    }

    #[test]
    fn test_missing_output_is_inference_error() {
        let response: InferResponse = serde_json::from_str(r#"{"outputs":[]}"#).unwrap();
        let err = extract_prediction(&response).unwrap_err();
        assert!(matches!(
            err,
            PredictError::Inference {
                backend: BackendKind::TensorServer,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_data_is_inference_error() {
        let response: InferResponse =
            serde_json::from_str(r#"{"outputs":[{"name":"prediction","data":[]}]}"#).unwrap();
        assert!(extract_prediction(&response).is_err());
    }

    #[test]
    fn test_endpoint_normalization() {
        assert_eq!(normalize_endpoint("triton:8000"), "http://triton:8000");
        assert_eq!(normalize_endpoint("http://triton:8000/"), "http://triton:8000");
        assert_eq!(
            normalize_endpoint("https://triton.example.com"),
            "https://triton.example.com"
        );
    }
}
