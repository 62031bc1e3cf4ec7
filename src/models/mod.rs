//! Local ONNX model components

pub mod loader;

pub use loader::{LoadedModel, ModelLoader};
