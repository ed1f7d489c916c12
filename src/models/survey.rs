//! Survey answers - the five ordinal model inputs
//!
//! `FEATURE_LAYOUT` is the single source of truth for feature order.
//! Model artifacts are checked against it at load time.

use serde::{Deserialize, Serialize};

/// Lowest answer on the survey scale
pub const MIN_SCORE: i64 = 1;

/// Highest answer on the survey scale
pub const MAX_SCORE: i64 = 5;

/// Total number of features
pub const FEATURE_COUNT: usize = 5;

/// Feature names in exact order the model expects them
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "sleep_quality",              // 0
    "headaches_per_week",         // 1
    "academic_performance",       // 2
    "study_load",                 // 3
    "extracurricular_activities", // 4
];

/// Display metadata for one survey input
#[derive(Debug, Clone, Serialize)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

/// Input controls, in layout order
pub const FEATURE_SPECS: [FeatureSpec; FEATURE_COUNT] = [
    FeatureSpec { name: "sleep_quality", label: "Sleep quality", min: MIN_SCORE, max: MAX_SCORE, default: 3 },
    FeatureSpec { name: "headaches_per_week", label: "Headaches per week", min: MIN_SCORE, max: MAX_SCORE, default: 2 },
    FeatureSpec { name: "academic_performance", label: "Academic performance", min: MIN_SCORE, max: MAX_SCORE, default: 3 },
    FeatureSpec { name: "study_load", label: "Study load", min: MIN_SCORE, max: MAX_SCORE, default: 3 },
    FeatureSpec { name: "extracurricular_activities", label: "Extracurricular activities", min: MIN_SCORE, max: MAX_SCORE, default: 2 },
];

/// One user's survey answers. Every field is in `[MIN_SCORE, MAX_SCORE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureVector {
    sleep_quality: i64,
    headaches_per_week: i64,
    academic_performance: i64,
    study_load: i64,
    extracurricular_activities: i64,
}

impl FeatureVector {
    /// Build from raw answers, clamping each into the survey range
    pub fn clamped(
        sleep_quality: i64,
        headaches_per_week: i64,
        academic_performance: i64,
        study_load: i64,
        extracurricular_activities: i64,
    ) -> Self {
        let clamp = |v: i64| v.clamp(MIN_SCORE, MAX_SCORE);
        Self {
            sleep_quality: clamp(sleep_quality),
            headaches_per_week: clamp(headaches_per_week),
            academic_performance: clamp(academic_performance),
            study_load: clamp(study_load),
            extracurricular_activities: clamp(extracurricular_activities),
        }
    }

    pub fn sleep_quality(&self) -> i64 {
        self.sleep_quality
    }

    pub fn headaches_per_week(&self) -> i64 {
        self.headaches_per_week
    }

    pub fn academic_performance(&self) -> i64 {
        self.academic_performance
    }

    pub fn study_load(&self) -> i64 {
        self.study_load
    }

    pub fn extracurricular_activities(&self) -> i64 {
        self.extracurricular_activities
    }

    /// Values in `FEATURE_LAYOUT` order
    pub fn as_array(&self) -> [i64; FEATURE_COUNT] {
        [
            self.sleep_quality,
            self.headaches_per_week,
            self.academic_performance,
            self.study_load,
            self.extracurricular_activities,
        ]
    }

    /// Model input row in `FEATURE_LAYOUT` order
    pub fn as_row(&self) -> [f64; FEATURE_COUNT] {
        self.as_array().map(|v| v as f64)
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::from(SurveyInput::default())
    }
}

/// Raw answers as submitted by a client. Missing fields fall back to the form defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyInput {
    pub sleep_quality: Option<i64>,
    pub headaches_per_week: Option<i64>,
    pub academic_performance: Option<i64>,
    pub study_load: Option<i64>,
    pub extracurricular_activities: Option<i64>,
}

impl From<SurveyInput> for FeatureVector {
    fn from(input: SurveyInput) -> Self {
        let [sleep, headaches, performance, load, extra] = FEATURE_SPECS.map(|s| s.default);
        FeatureVector::clamped(
            input.sleep_quality.unwrap_or(sleep),
            input.headaches_per_week.unwrap_or(headaches),
            input.academic_performance.unwrap_or(performance),
            input.study_load.unwrap_or(load),
            input.extracurricular_activities.unwrap_or(extra),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form() {
        let v = FeatureVector::default();
        assert_eq!(v.as_array(), [3, 2, 3, 3, 2]);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let v = FeatureVector::clamped(0, 9, -3, 5, 1);
        assert_eq!(v.as_array(), [1, 5, 1, 5, 1]);
    }

    #[test]
    fn test_partial_input_uses_defaults() {
        let input = SurveyInput {
            sleep_quality: Some(5),
            study_load: Some(1),
            ..Default::default()
        };
        let v = FeatureVector::from(input);
        assert_eq!(v.as_array(), [5, 2, 3, 1, 2]);
    }

    #[test]
    fn test_row_follows_layout() {
        let v = FeatureVector::clamped(1, 2, 3, 4, 5);
        assert_eq!(v.as_row(), [1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(FEATURE_SPECS.map(|s| s.name), FEATURE_LAYOUT);
    }
}
