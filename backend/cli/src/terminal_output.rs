//! Terminal output: colored notes and popup snapshot rendering.

use folio_popup::{PopupSnapshot, PopupState};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && std::env::var("TERM")
            .map(|t| t != "dumb")
            .unwrap_or(false)
}

/// Print a formatted INFO note to stdout.
pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

/// Print a formatted WARNING note.
pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

/// Print a formatted SUCCESS note.
pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

fn state_label(state: PopupState) -> &'static str {
    match state {
        PopupState::Hidden => "hidden",
        PopupState::Animating => "animating",
        PopupState::Visible => "visible",
        PopupState::ShowingTerms => "showing terms",
    }
}

/// One-line, uncolored summary of a popup snapshot.
pub fn render_snapshot(snapshot: &PopupSnapshot) -> String {
    let mut line = format!("popup: {}", state_label(snapshot.state));
    if snapshot.is_visible {
        let values = snapshot.values;
        line.push_str(&format!(
            " | reward ${} | {}% off | earn up to ${}",
            values.reward, values.discount_percent, values.max_earning
        ));
    }
    match snapshot.last_seen {
        Some(at) => line.push_str(&format!(" | last dismissed at {at}")),
        None => line.push_str(" | never dismissed"),
    }
    line
}
