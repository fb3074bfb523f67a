//! Folio Gateway HTTP API Server
//!
//! Serves the visitor counter and a health probe.

pub mod error;
pub mod health_api;
pub mod server;
pub mod visitors_api;

pub use error::AppError;
pub use server::{build_router, start_server, GatewayState};
