//! Cool-down between automatic shows.

use std::time::Duration;

/// Parse the persisted last-dismissal timestamp. Anything malformed counts
/// as never seen.
pub fn parse_last_seen(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}

/// Whether the automatic show may run at `now_millis`.
///
/// Eligible when nothing was persisted or strictly more than `cooldown` has
/// passed. A timestamp in the future keeps the popup suppressed.
pub fn auto_show_eligible(last_seen: Option<i64>, now_millis: i64, cooldown: Duration) -> bool {
    match last_seen {
        None => true,
        Some(seen) => {
            let window = i64::try_from(cooldown.as_millis()).unwrap_or(i64::MAX);
            now_millis.saturating_sub(seen) > window
        }
    }
}
