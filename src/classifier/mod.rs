//! Classifier Module - pre-trained stress model
//!
//! The model is an opaque artifact loaded once at startup. Everything else
//! talks to it through `PredictiveModel`, so the artifact format can change
//! without touching the prediction flow.

pub mod forest;
#[cfg(feature = "onnx")]
pub mod onnx;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{ModelError, StartupError};
use crate::models::FeatureVector;

pub use forest::ForestModel;

/// Binary classifier over the five survey features
pub trait PredictiveModel: Send + Sync {
    /// Predicted class index
    fn predict(&self, features: &FeatureVector) -> Result<usize, ModelError>;

    /// Probability per class, indexed by class
    fn predict_probability(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;
}

/// Model metadata for logs and health checks
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_path: String,
    pub format: String,
    pub trees: Option<usize>,
    pub sha256: String,
    pub loaded_at: DateTime<Utc>,
}

/// Load the model artifact at `path`, picking the format from its extension
pub fn load_model(path: &Path) -> Result<(Arc<dyn PredictiveModel>, ModelInfo), StartupError> {
    let path_str = path.display().to_string();
    tracing::info!("Loading model from: {}", path_str);

    if !path.exists() {
        return Err(StartupError::ModelNotFound(path_str));
    }

    let bytes = std::fs::read(path).map_err(|source| StartupError::Io {
        path: path_str.clone(),
        source,
    })?;
    let sha256 = hex::encode(Sha256::digest(&bytes));

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let (model, format, trees): (Arc<dyn PredictiveModel>, &str, Option<usize>) = match extension.as_str() {
        "json" => {
            let forest = ForestModel::from_json(&bytes)?;
            let trees = forest.tree_count();
            (Arc::new(forest) as Arc<dyn PredictiveModel>, "random_forest_json", Some(trees))
        }
        #[cfg(feature = "onnx")]
        "onnx" => {
            let session = onnx::OnnxModel::from_bytes(&bytes)?;
            (Arc::new(session) as Arc<dyn PredictiveModel>, "onnx", None)
        }
        #[cfg(not(feature = "onnx"))]
        "onnx" => {
            return Err(StartupError::UnsupportedFormat(
                "onnx (rebuild with --features onnx)".to_string(),
            ))
        }
        other => return Err(StartupError::UnsupportedFormat(format!(".{}", other))),
    };

    let info = ModelInfo {
        model_path: path_str,
        format: format.to_string(),
        trees,
        sha256,
        loaded_at: Utc::now(),
    };

    tracing::info!("Model loaded ({}, sha256 {})", info.format, info.sha256);
    Ok((model, info))
}
