//! Survey form metadata handler

use axum::Json;
use serde::Serialize;

use crate::models::{FeatureSpec, FEATURE_SPECS};

#[derive(Serialize)]
pub struct FormResponse {
    features: Vec<FeatureSpec>,
}

/// Input controls with their ranges and defaults
pub async fn describe() -> Json<FormResponse> {
    Json(FormResponse {
        features: FEATURE_SPECS.to_vec(),
    })
}
