//! Prediction model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::survey::FeatureVector;

/// Binary stress outcome, ordered by class index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "STRES RENDAH/NORMAL")]
    LowOrNormal,
    #[serde(rename = "STRES TINGGI")]
    High,
}

impl Label {
    /// Every label in class-index order
    pub const ALL: [Label; 2] = [Label::LowOrNormal, Label::High];

    /// Map a model class index. 1 is high stress, 0 is low/normal.
    pub fn from_class_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::LowOrNormal),
            1 => Some(Label::High),
            _ => None,
        }
    }

    pub fn class_index(self) -> usize {
        match self {
            Label::LowOrNormal => 0,
            Label::High => 1,
        }
    }

    /// Stored label text
    pub fn as_str(self) -> &'static str {
        match self {
            Label::LowOrNormal => "STRES RENDAH/NORMAL",
            Label::High => "STRES TINGGI",
        }
    }

    /// Column heading for the probability breakdown
    pub fn display_name(self) -> &'static str {
        match self {
            Label::LowOrNormal => "Low stress",
            Label::High => "High stress",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted row of the `predictions` table
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PredictionRecord {
    pub id: i64,
    pub timestamp: String,
    pub sleep_quality: i64,
    pub headaches_per_week: i64,
    pub academic_performance: i64,
    pub study_load: i64,
    pub extracurricular_activities: i64,
    pub prediction_result: String,
    pub prediction_probability: f64,
}

/// A record before the store assigns `id` and `timestamp`
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub features: FeatureVector,
    pub label: Label,
    pub probability: f64,
}

/// Result of one predict-and-save interaction
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub label: Label,
    pub probability: f64,
    /// Probability formatted as a percentage, e.g. `91.00%`
    pub confidence_display: String,
    /// Probability per label, iterated in class-index order
    pub class_probabilities: BTreeMap<Label, f64>,
    pub saved: bool,
    pub notice: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryFilter {
    pub limit: Option<i64>,
}

/// Format a probability as a two-decimal percentage
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}
