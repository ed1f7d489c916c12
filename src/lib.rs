//! Student stress survey
//!
//! Collects five ordinal survey answers, asks a pre-trained classifier for a
//! high vs. low/normal stress label, and appends every result to a local
//! SQLite history.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Survey page / JSON API (Axum)                       │
//! └──────────────────────────┬───────────────────────────┘
//!                            ▼
//!                 ┌─────────────────────┐
//!                 │  PredictionService  │
//!                 └──────┬────────┬─────┘
//!                        ▼        ▼
//!          ┌─────────────────┐  ┌─────────────────┐
//!          │ PredictiveModel │  │   RecordStore   │
//!          │ (forest / onnx) │  │    (SQLite)     │
//!          └─────────────────┘  └─────────────────┘
//! ```

pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;

use axum::{
    Router,
    routing::get,
};
use tower_http::trace::TraceLayer;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: service::PredictionService,
    pub config: config::Config,
    pub model_info: classifier::ModelInfo,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Survey page
        .route("/", get(handlers::page::index).post(handlers::page::submit))

        // JSON API
        .route("/health", get(handlers::health::check))
        .route("/api/v1/form", get(handlers::form::describe))
        .route(
            "/api/v1/predictions",
            get(handlers::predictions::list).post(handlers::predictions::create),
        )

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
