//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Failures while loading the model artifact. Fatal at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),

    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Malformed(String),

    #[error("feature layout mismatch: expected {expected:?}, model has {found:?}")]
    LayoutMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
}

/// Failures from a single prediction call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model returned class index {0}, expected 0 or 1")]
    UnknownClass(usize),

    #[error("model returned {0} class probabilities, expected 2")]
    BadDistribution(usize),

    #[error("model returned invalid probability {0}")]
    InvalidProbability(f64),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Failures from the local prediction store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),
}

#[derive(Debug)]
pub enum AppError {
    // Prediction errors
    Prediction(String),

    // Validation errors
    ValidationError(String),

    // Database errors
    DatabaseError(String),

    // Internal errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Prediction(msg) => {
                tracing::warn!("Prediction error: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str())
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::Prediction(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::InternalError(format!("page render failed: {}", err))
    }
}
