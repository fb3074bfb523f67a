//! Visitor counter endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::AppError;
use crate::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct VisitorCount {
    pub count: u64,
}

/// Handler for `GET /api/visitors`: counts this visit and returns the total.
pub async fn count_visit(
    State(state): State<Arc<GatewayState>>,
) -> Result<Json<VisitorCount>, AppError> {
    let count = state.counter.increment_and_get().await?;
    Ok(Json(VisitorCount { count }))
}
