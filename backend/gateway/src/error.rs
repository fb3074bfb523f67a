use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_core::FolioError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by gateway handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("visitor counter failed: {0}")]
    Counter(#[from] FolioError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details stay in the log; clients only get a generic failure.
        error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}
