//! Error types for the monitor API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. No API
//! failure is fatal to the process; a rejected upload leaves the snapshot
//! store untouched.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the monitor API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An upload payload failed validation; the store was not touched.
    #[error("validation error: {0}")]
    Validation(#[from] linewatch_types::ValidationError),

    /// An invalid query parameter was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A history query was made but no table store was initialized.
    #[error("archive store not configured")]
    ArchiveUnavailable,

    /// A table-store query failed.
    #[error("table store error: {0}")]
    Database(#[from] linewatch_db::DbError),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::ArchiveUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            Self::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
