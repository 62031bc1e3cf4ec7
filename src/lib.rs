//! Wine Prediction Service Library
//!
//! An HTTP prediction API that routes each request to one of three
//! backends resolved at startup: a local ONNX model, a remote tensor
//! inference server, or a remote JSON inference gateway.

pub mod backend;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod router;
pub mod server;
pub mod types;

pub use backend::Backend;
pub use config::{AppConfig, RoutingMode};
pub use error::{BackendKind, PredictError};
pub use metrics::RequestMetrics;
pub use router::PredictionRouter;
pub use types::{PredictionResponse, WineFeatures};
