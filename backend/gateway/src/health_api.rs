//! Gateway Health API

use axum::Json;
use serde_json::{Value, json};

/// Handler for `GET /api/health`
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "folio",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let Json(body) = get_health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "folio");
    }
}
