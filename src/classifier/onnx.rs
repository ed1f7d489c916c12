//! ONNX classifier - ONNX Runtime integration
//!
//! Expects a classifier exported with zipmap disabled: one float input of
//! shape `[N, 5]`, then an int64 label output and a float probability output
//! of shape `[N, 2]`, in that order.

use ndarray::Array2;
use parking_lot::Mutex;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use crate::error::{ModelError, StartupError};
use crate::models::{FeatureVector, FEATURE_COUNT};
use super::PredictiveModel;

pub struct OnnxModel {
    session: Mutex<Session>,
    label_output: String,
    probability_output: String,
}

impl OnnxModel {
    /// Load ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, StartupError> {
        tracing::info!("Loading ONNX model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| StartupError::Malformed(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| StartupError::Malformed(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| StartupError::Malformed(format!("Load from memory error: {}", e)))?;

        if session.inputs.len() != 1 {
            return Err(StartupError::Malformed(format!(
                "expected 1 input, model has {}",
                session.inputs.len()
            )));
        }

        let mut outputs = session.outputs.iter().map(|o| o.name.clone());
        let (label_output, probability_output) = match (outputs.next(), outputs.next()) {
            (Some(label), Some(proba)) => (label, proba),
            _ => {
                return Err(StartupError::Malformed(
                    "expected label and probability outputs".to_string(),
                ))
            }
        };

        Ok(Self {
            session: Mutex::new(session),
            label_output,
            probability_output,
        })
    }

    fn input_tensor(features: &FeatureVector) -> Result<Value, ModelError> {
        let row: Vec<f32> = features.as_row().iter().map(|v| *v as f32).collect();
        let array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), row)
            .map_err(|e| ModelError::Inference(format!("Array error: {}", e)))?;

        Value::from_array(array)
            .map(|tensor| tensor.into_dyn())
            .map_err(|e| ModelError::Inference(format!("Tensor error: {}", e)))
    }
}

impl PredictiveModel for OnnxModel {
    fn predict(&self, features: &FeatureVector) -> Result<usize, ModelError> {
        let input = Self::input_tensor(features)?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.label_output)
            .ok_or_else(|| ModelError::Inference("No label output".to_string()))?;
        let (_, labels) = output
            .try_extract_tensor::<i64>()
            .map_err(|e| ModelError::Inference(format!("Extract error: {}", e)))?;

        let label = labels
            .first()
            .copied()
            .ok_or_else(|| ModelError::Inference("Empty label output".to_string()))?;

        usize::try_from(label).map_err(|_| ModelError::Inference(format!("Negative class {}", label)))
    }

    fn predict_probability(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let input = Self::input_tensor(features)?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.probability_output)
            .ok_or_else(|| ModelError::Inference("No probability output".to_string()))?;
        let (_, proba) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(format!("Extract error: {}", e)))?;

        Ok(proba.iter().map(|p| *p as f64).collect())
    }
}
