//! Site Event Logger
//!
//! Structured events (popup shown/dismissed, terms toggled, visit counted)
//! written through `tracing` on the `site_events` target.

use serde::Serialize;
use tracing::info;

/// What caused the popup to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowTrigger {
    /// The post-mount delay elapsed with the cool-down expired.
    Automatic,
    /// A show request arrived on the signal bus.
    Manual,
}

/// How the popup was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    CloseButton,
    Backdrop,
    ReferNow,
    ClientLogin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SiteEvent {
    PopupShown {
        trigger: ShowTrigger,
    },
    PopupDismissed {
        reason: DismissReason,
        at_millis: i64,
    },
    TermsToggled {
        open: bool,
    },
    VisitorCounted {
        count: u64,
    },
}

pub struct SiteEventLogger;

impl SiteEventLogger {
    /// Serialize the event and hand it to the tracing system.
    pub fn log_event(event: SiteEvent) {
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| format!("{event:?}"));
        info!(target: "site_events", event = %payload, "Site event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(SiteEvent::PopupDismissed {
            reason: DismissReason::Backdrop,
            at_millis: 42,
        })
        .unwrap();
        assert_eq!(json["type"], "popup_dismissed");
        assert_eq!(json["reason"], "backdrop");
        assert_eq!(json["at_millis"], 42);

        let json = serde_json::to_value(SiteEvent::PopupShown {
            trigger: ShowTrigger::Manual,
        })
        .unwrap();
        assert_eq!(json["trigger"], "manual");
    }
}
