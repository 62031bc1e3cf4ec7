//! Error types for the prediction router

use std::fmt;
use thiserror::Error;

/// Identifies which backend a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    TensorServer,
    Gateway,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::TensorServer => write!(f, "tensor-server"),
            BackendKind::Gateway => write!(f, "gateway"),
        }
    }
}

/// Failures surfaced at the router boundary.
///
/// None of these are retried automatically and none abort the process;
/// the HTTP layer maps them to a status code and a diagnostic body.
#[derive(Debug, Error)]
pub enum PredictError {
    /// No backend is configured and no local model was loaded at startup
    #[error("Model not loaded")]
    ModelNotLoaded,

    /// Request failed schema validation before reaching any backend
    #[error("Invalid feature vector: {0}")]
    InvalidFeatures(String),

    /// Could not reach the remote backend (connect failure or timeout)
    #[error("{backend} backend unreachable: {message}")]
    Transport {
        backend: BackendKind,
        message: String,
    },

    /// The backend answered but inference failed (non-2xx or bad payload)
    #[error("{backend} inference failed: {message}")]
    Inference {
        backend: BackendKind,
        message: String,
    },
}

impl PredictError {
    /// The backend involved in the failure, if any.
    pub fn backend(&self) -> Option<BackendKind> {
        match self {
            PredictError::ModelNotLoaded | PredictError::InvalidFeatures(_) => None,
            PredictError::Transport { backend, .. } | PredictError::Inference { backend, .. } => {
                Some(*backend)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_backend() {
        let err = PredictError::Transport {
            backend: BackendKind::TensorServer,
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "tensor-server backend unreachable: connection refused"
        );

        let err = PredictError::Inference {
            backend: BackendKind::Gateway,
            message: "status 503".to_string(),
        };
        assert!(err.to_string().starts_with("gateway inference failed"));
    }

    #[test]
    fn test_backend_attribution() {
        assert_eq!(PredictError::ModelNotLoaded.backend(), None);
        let err = PredictError::Inference {
            backend: BackendKind::Local,
            message: "session error".to_string(),
        };
        assert_eq!(err.backend(), Some(BackendKind::Local));
    }
}
