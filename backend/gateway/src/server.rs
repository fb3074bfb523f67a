//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::get};
use folio_counter::VisitorCounter;
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use crate::health_api;
use crate::visitors_api;

/// Application state shared across routes.
pub struct GatewayState {
    pub counter: VisitorCounter,
}

/// Build the router with all API routes.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/api/health", get(health_api::get_health))
        .route("/api/visitors", get(visitors_api::count_visit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Starts the HTTP server and runs until Ctrl+C or SIGTERM.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: Arc<GatewayState>) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Gateway HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use folio_storage::InMemoryDocumentStore;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn router() -> Router {
        build_router(Arc::new(GatewayState {
            counter: VisitorCounter::new(Arc::new(InMemoryDocumentStore::new()), "visitors/counter"),
        }))
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Option<Value>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    #[tokio::test]
    async fn test_get_visitors_counts_through_router() {
        let app = router();

        let (status, body) = send(app.clone(), Method::GET, "/api/visitors").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Some(json!({ "count": 1 })));

        let (_, body) = send(app, Method::GET, "/api/visitors").await;
        assert_eq!(body, Some(json!({ "count": 2 })));
    }

    #[tokio::test]
    async fn test_post_visitors_is_not_allowed() {
        let (status, _) = send(router(), Method::POST, "/api/visitors").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_route() {
        let (status, body) = send(router(), Method::GET, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["status"], "ok");
    }
}
