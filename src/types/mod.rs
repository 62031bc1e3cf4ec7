//! Type definitions for the wine prediction service

pub mod features;

pub use features::{PredictionResponse, WineFeatures};
