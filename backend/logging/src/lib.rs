//! Telemetry and structured logging components for Folio.
//!
//! Handles subscriber setup (console + optional rolling NDJSON file) and
//! structured site events emitted by the popup and the visitor counter.

pub mod logger;
pub mod site_events;

pub use logger::{init_logger, LoggingOptions};
pub use site_events::{DismissReason, ShowTrigger, SiteEvent, SiteEventLogger};
