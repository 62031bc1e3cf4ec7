//! Wine feature vector schema and model-input ordering.
//!
//! The 13 features match the wine quality training data. Request bodies
//! use snake_case names throughout; the training CSV carried one column
//! with a slash in its header (`od280/od315_of_diluted_wines`), so local
//! inference renames that field when building the model input.

use crate::error::PredictError;
use serde::{Deserialize, Serialize};

/// Feature names as they appear on the wire (request body and tensor
/// input names), in training column order.
pub const FEATURE_NAMES: [&str; 13] = [
    "alcohol",
    "malic_acid",
    "ash",
    "alcalinity_of_ash",
    "magnesium",
    "total_phenols",
    "flavanoids",
    "nonflavanoid_phenols",
    "proanthocyanins",
    "color_intensity",
    "hue",
    "od280_od315_of_diluted_wines",
    "proline",
];

/// Column names exactly as the model was trained, in the order the model
/// expects. Differs from [`FEATURE_NAMES`] only in the od280/od315 column.
pub const TRAINING_COLUMNS: [&str; 13] = [
    "alcohol",
    "malic_acid",
    "ash",
    "alcalinity_of_ash",
    "magnesium",
    "total_phenols",
    "flavanoids",
    "nonflavanoid_phenols",
    "proanthocyanins",
    "color_intensity",
    "hue",
    "od280/od315_of_diluted_wines",
    "proline",
];

/// A single wine sample to score.
///
/// All 13 fields are required; deserialization fails if any is missing,
/// so an incomplete request never reaches a backend. Field order in the
/// request body does not matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WineFeatures {
    pub alcohol: f64,
    pub malic_acid: f64,
    pub ash: f64,
    pub alcalinity_of_ash: f64,
    pub magnesium: f64,
    pub total_phenols: f64,
    pub flavanoids: f64,
    pub nonflavanoid_phenols: f64,
    pub proanthocyanins: f64,
    pub color_intensity: f64,
    pub hue: f64,
    pub od280_od315_of_diluted_wines: f64,
    pub proline: f64,
}

impl WineFeatures {
    /// Reject non-finite values. JSON cannot encode NaN or infinity, but
    /// features can also arrive through non-JSON construction paths.
    pub fn validate(&self) -> Result<(), PredictError> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(PredictError::InvalidFeatures(format!(
                    "feature '{}' is not a finite number",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Feature values paired with their wire names, in training order.
    pub fn named_values(&self) -> [(&'static str, f64); 13] {
        [
            ("alcohol", self.alcohol),
            ("malic_acid", self.malic_acid),
            ("ash", self.ash),
            ("alcalinity_of_ash", self.alcalinity_of_ash),
            ("magnesium", self.magnesium),
            ("total_phenols", self.total_phenols),
            ("flavanoids", self.flavanoids),
            ("nonflavanoid_phenols", self.nonflavanoid_phenols),
            ("proanthocyanins", self.proanthocyanins),
            ("color_intensity", self.color_intensity),
            ("hue", self.hue),
            (
                "od280_od315_of_diluted_wines",
                self.od280_od315_of_diluted_wines,
            ),
            ("proline", self.proline),
        ]
    }

    /// Look up a value by its training column name, applying the
    /// od280/od315 rename.
    pub fn column_value(&self, column: &str) -> Option<f64> {
        if column == "od280/od315_of_diluted_wines" {
            return Some(self.od280_od315_of_diluted_wines);
        }
        self.named_values()
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| *value)
    }

    /// Build the model input row in the exact column order the model was
    /// trained with. Infallible because [`TRAINING_COLUMNS`] is a fixed
    /// permutation of the schema.
    pub fn to_model_input(&self) -> Vec<f32> {
        TRAINING_COLUMNS
            .iter()
            .map(|column| self.column_value(column).unwrap_or_default() as f32)
            .collect()
    }
}

/// Response body for a successful prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: f64,
}
