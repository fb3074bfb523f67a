//! Popup state as seen by consumers.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PopupState {
    Hidden,
    /// Open, counters still climbing.
    Animating,
    Visible,
    /// Terms overlay open on top of the popup.
    ShowingTerms,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimatedValues {
    pub reward: u32,
    pub discount_percent: u32,
    pub max_earning: u32,
}

/// Point-in-time view of a mounted popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupSnapshot {
    pub state: PopupState,
    pub is_visible: bool,
    pub terms_open: bool,
    pub values: AnimatedValues,
    /// Last dismissal in epoch millis, if any.
    pub last_seen: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_camel_case() {
        let snapshot = PopupSnapshot {
            state: PopupState::ShowingTerms,
            is_visible: true,
            terms_open: true,
            values: AnimatedValues {
                reward: 500,
                discount_percent: 25,
                max_earning: 5_000,
            },
            last_seen: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "showingTerms");
        assert_eq!(json["isVisible"], true);
        assert_eq!(json["values"]["discountPercent"], 25);
        assert!(json["lastSeen"].is_null());
    }
}
