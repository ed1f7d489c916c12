//! Random forest classifier loaded from a JSON export
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "feature_names": ["sleep_quality", "headaches_per_week", "academic_performance",
//!                     "study_load", "extracurricular_activities"],
//!   "n_classes": 2,
//!   "trees": [
//!     { "split": { "feature": 1, "threshold": 2.5,
//!                  "left":  { "leaf": { "value": [91.0, 9.0] } },
//!                  "right": { "leaf": { "value": [12.0, 88.0] } } } }
//!   ]
//! }
//! ```
//!
//! A sample goes left when `x[feature] <= threshold`. Leaf `value` holds per-class
//! weights (sample counts or fractions) and is normalized at load time.

use serde::Deserialize;

use crate::error::{ModelError, StartupError};
use crate::models::{FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};
use super::PredictiveModel;

/// Number of classes the survey model distinguishes
pub const CLASS_COUNT: usize = 2;

/// A node in a decision tree (either split or leaf)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        value: Vec<f64>,
    },
}

impl TreeNode {
    /// Class distribution of the leaf `row` lands in
    fn leaf_for(&self, row: &[f64; FEATURE_COUNT]) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { left.as_ref() } else { right.as_ref() };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }

    /// Check indices and widths, and normalize leaf weights to sum to 1
    fn validate(&mut self, n_classes: usize) -> Result<(), StartupError> {
        match self {
            TreeNode::Split { feature, threshold, left, right } => {
                if *feature >= FEATURE_COUNT {
                    return Err(StartupError::Malformed(format!(
                        "split on feature {} but only {} features exist",
                        feature, FEATURE_COUNT
                    )));
                }
                if !threshold.is_finite() {
                    return Err(StartupError::Malformed("non-finite split threshold".to_string()));
                }
                left.validate(n_classes)?;
                right.validate(n_classes)
            }
            TreeNode::Leaf { value } => {
                if value.len() != n_classes {
                    return Err(StartupError::Malformed(format!(
                        "leaf has {} class weights, expected {}",
                        value.len(),
                        n_classes
                    )));
                }
                if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(StartupError::Malformed("leaf weights must be finite and non-negative".to_string()));
                }
                let total: f64 = value.iter().sum();
                if total <= 0.0 {
                    return Err(StartupError::Malformed("leaf weights sum to zero".to_string()));
                }
                value.iter_mut().for_each(|w| *w /= total);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    feature_names: Vec<String>,
    n_classes: usize,
    trees: Vec<TreeNode>,
}

/// Forest whose class probabilities are the mean of its trees' leaf distributions
#[derive(Debug, Clone)]
pub struct ForestModel {
    trees: Vec<TreeNode>,
}

impl ForestModel {
    /// Parse and validate a JSON forest export
    pub fn from_json(bytes: &[u8]) -> Result<Self, StartupError> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)
            .map_err(|e| StartupError::Malformed(e.to_string()))?;

        if artifact.feature_names.iter().map(String::as_str).ne(FEATURE_LAYOUT.iter().copied()) {
            return Err(StartupError::LayoutMismatch {
                expected: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
                found: artifact.feature_names,
            });
        }

        if artifact.n_classes != CLASS_COUNT {
            return Err(StartupError::Malformed(format!(
                "model has {} classes, expected {}",
                artifact.n_classes, CLASS_COUNT
            )));
        }

        if artifact.trees.is_empty() {
            return Err(StartupError::Malformed("forest has no trees".to_string()));
        }

        let mut trees = artifact.trees;
        for tree in &mut trees {
            tree.validate(CLASS_COUNT)?;
        }

        Ok(Self { trees })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn distribution(&self, features: &FeatureVector) -> Vec<f64> {
        let row = features.as_row();
        let mut proba = vec![0.0; CLASS_COUNT];

        for tree in &self.trees {
            for (p, w) in proba.iter_mut().zip(tree.leaf_for(&row)) {
                *p += w;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }
}

impl PredictiveModel for ForestModel {
    fn predict(&self, features: &FeatureVector) -> Result<usize, ModelError> {
        let proba = self.distribution(features);

        // First maximum wins ties
        let mut best = 0;
        for (class, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = class;
            }
        }
        Ok(best)
    }

    fn predict_probability(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        Ok(self.distribution(features))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Single stump on `headaches_per_week`
    pub(crate) const STUMP_JSON: &str = r#"{
        "feature_names": ["sleep_quality", "headaches_per_week", "academic_performance",
                          "study_load", "extracurricular_activities"],
        "n_classes": 2,
        "trees": [
            { "split": { "feature": 1, "threshold": 2.5,
                         "left":  { "leaf": { "value": [91.0, 9.0] } },
                         "right": { "leaf": { "value": [12.0, 88.0] } } } }
        ]
    }"#;

    fn forest_json(trees: &str) -> String {
        format!(
            r#"{{ "feature_names": {:?}, "n_classes": 2, "trees": [{}] }}"#,
            FEATURE_LAYOUT, trees
        )
    }

    #[test]
    fn test_stump_routes_by_threshold() {
        let model = ForestModel::from_json(STUMP_JSON.as_bytes()).unwrap();

        let calm = FeatureVector::clamped(5, 1, 5, 1, 1);
        assert_eq!(model.predict(&calm).unwrap(), 0);
        assert_eq!(model.predict_probability(&calm).unwrap(), vec![0.91, 0.09]);

        let strained = FeatureVector::clamped(1, 5, 1, 5, 5);
        assert_eq!(model.predict(&strained).unwrap(), 1);
        assert_eq!(model.predict_probability(&strained).unwrap(), vec![0.12, 0.88]);
    }

    #[test]
    fn test_probabilities_average_across_trees() {
        let json = forest_json(
            r#"{ "leaf": { "value": [1.0, 0.0] } },
               { "leaf": { "value": [1.0, 3.0] } }"#,
        );
        let model = ForestModel::from_json(json.as_bytes()).unwrap();
        let v = FeatureVector::default();

        assert_eq!(model.tree_count(), 2);
        assert_eq!(model.predict_probability(&v).unwrap(), vec![0.625, 0.375]);
        assert_eq!(model.predict(&v).unwrap(), 0);
    }

    #[test]
    fn test_tie_predicts_first_class() {
        let json = forest_json(
            r#"{ "leaf": { "value": [1.0, 0.0] } },
               { "leaf": { "value": [0.0, 1.0] } }"#,
        );
        let model = ForestModel::from_json(json.as_bytes()).unwrap();
        assert_eq!(model.predict(&FeatureVector::default()).unwrap(), 0);
    }

    #[test]
    fn test_predicted_class_has_highest_probability() {
        let model = ForestModel::from_json(STUMP_JSON.as_bytes()).unwrap();
        for headaches in 1..=5 {
            let v = FeatureVector::clamped(3, headaches, 3, 3, 3);
            let class = model.predict(&v).unwrap();
            let proba = model.predict_probability(&v).unwrap();
            assert!(proba.iter().all(|p| *p <= proba[class]));
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reordered_features_rejected() {
        let json = STUMP_JSON.replace(
            r#"["sleep_quality", "headaches_per_week""#,
            r#"["headaches_per_week", "sleep_quality""#,
        );
        let result = ForestModel::from_json(json.as_bytes());
        assert!(matches!(result, Err(StartupError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_bad_split_feature_rejected() {
        let json = forest_json(
            r#"{ "split": { "feature": 7, "threshold": 1.5,
                            "left": { "leaf": { "value": [1.0, 0.0] } },
                            "right": { "leaf": { "value": [0.0, 1.0] } } } }"#,
        );
        assert!(matches!(ForestModel::from_json(json.as_bytes()), Err(StartupError::Malformed(_))));
    }

    #[test]
    fn test_wrong_leaf_width_rejected() {
        let json = forest_json(r#"{ "leaf": { "value": [1.0, 0.0, 0.0] } }"#);
        assert!(matches!(ForestModel::from_json(json.as_bytes()), Err(StartupError::Malformed(_))));
    }

    #[test]
    fn test_empty_forest_rejected() {
        let json = forest_json("");
        assert!(matches!(ForestModel::from_json(json.as_bytes()), Err(StartupError::Malformed(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(ForestModel::from_json(b"\x80\x04joblib"), Err(StartupError::Malformed(_))));
    }
}
