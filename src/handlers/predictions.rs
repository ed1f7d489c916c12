//! Predictions handlers

use axum::{extract::{State, Query}, Json};

use crate::{AppState, AppResult, AppError};
use crate::models::{FeatureVector, HistoryFilter, PredictionOutcome, PredictionRecord, SurveyInput};

/// Upper bound for a single history request
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Predict from survey answers and save the result
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<SurveyInput>,
) -> AppResult<Json<PredictionOutcome>> {
    let features = FeatureVector::from(req);
    let outcome = state.service.predict_and_record(features).await?;
    Ok(Json(outcome))
}

/// List recent predictions, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<HistoryFilter>,
) -> AppResult<Json<Vec<PredictionRecord>>> {
    let limit = filter.limit.unwrap_or(state.config.history_limit);
    if limit < 1 {
        return Err(AppError::ValidationError("limit must be at least 1".to_string()));
    }

    let records = state.service.history(limit.min(MAX_HISTORY_LIMIT)).await;
    Ok(Json(records))
}
