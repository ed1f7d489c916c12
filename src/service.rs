//! Prediction service - one predict-and-save interaction
//!
//! Runs the model, builds the displayable outcome, then appends the record.
//! A failed append never hides the prediction: the outcome comes back with
//! `saved = false` and a failure notice instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::classifier::PredictiveModel;
use crate::db::RecordStore;
use crate::error::ModelError;
use crate::models::{format_percent, FeatureVector, Label, NewPrediction, PredictionOutcome, PredictionRecord};

pub const SAVED_NOTICE: &str = "This prediction has been saved to history.";
pub const NOT_SAVED_NOTICE: &str = "This prediction could not be saved to history.";

#[derive(Clone)]
pub struct PredictionService {
    model: Arc<dyn PredictiveModel>,
    store: RecordStore,
}

impl PredictionService {
    pub fn new(model: Arc<dyn PredictiveModel>, store: RecordStore) -> Self {
        Self { model, store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Predict the stress label for `features` and record it
    pub async fn predict_and_record(&self, features: FeatureVector) -> Result<PredictionOutcome, ModelError> {
        let class = self.model.predict(&features)?;
        let distribution = self.model.predict_probability(&features)?;

        let label = Label::from_class_index(class).ok_or(ModelError::UnknownClass(class))?;
        if distribution.len() != Label::ALL.len() {
            return Err(ModelError::BadDistribution(distribution.len()));
        }
        if let Some(bad) = distribution.iter().find(|p| !p.is_finite() || !(0.0..=1.0).contains(*p)) {
            return Err(ModelError::InvalidProbability(*bad));
        }
        let probability = distribution[label.class_index()];

        tracing::info!("Predicted {} ({}) for {:?}", label, format_percent(probability), features.as_array());

        let record = NewPrediction { features, label, probability };
        let (saved, notice) = match self.store.append(&record).await {
            Ok(()) => (true, SAVED_NOTICE),
            Err(e) => {
                tracing::error!("Failed to save prediction: {}", e);
                (false, NOT_SAVED_NOTICE)
            }
        };

        let class_probabilities: BTreeMap<Label, f64> = Label::ALL.into_iter().zip(distribution).collect();

        Ok(PredictionOutcome {
            label,
            probability,
            confidence_display: format_percent(probability),
            class_probabilities,
            saved,
            notice: notice.to_string(),
        })
    }

    /// Newest `limit` records, empty if the store cannot be read
    pub async fn history(&self, limit: i64) -> Vec<PredictionRecord> {
        self.store.load_recent(limit).await
    }
}
