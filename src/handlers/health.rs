//! Health check handler
//!
//! The model is loaded before the server starts, so the process is healthy as
//! long as it answers. An unreadable store only degrades the report.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use crate::classifier::ModelInfo;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model: ModelInfo,
    /// `None` when the store cannot be read
    stored_predictions: Option<i64>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, stored_predictions) = match state.service.store().count().await {
        Ok(count) => ("healthy", Some(count)),
        Err(e) => {
            tracing::warn!("Health check could not read store: {}", e);
            ("degraded", None)
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model: state.model_info.clone(),
        stored_predictions,
    })
}
