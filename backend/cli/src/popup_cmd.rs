//! CLI Popup Command
//!
//! Mounts the referral popup against the configured key-value store and
//! drives it from stdin, one command per line.

use std::sync::Arc;

use anyhow::Result;
use folio_config::FolioConfig;
use folio_core::{SignalBus, SiteSignal};
use folio_popup::{PopupActions, PopupController, PopupSettings, UserAction};
use folio_scheduler::SystemClock;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use crate::stores;
use crate::terminal_output;

const HELP: &str = "commands: close, backdrop, panel, refer, login, terms, terms-close, \
                    terms-backdrop, terms-panel, show, quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreviewCommand {
    Act(UserAction),
    Show,
    Quit,
}

fn parse_command(line: &str) -> Option<PreviewCommand> {
    let command = match line.trim() {
        "close" => PreviewCommand::Act(UserAction::Close),
        "backdrop" => PreviewCommand::Act(UserAction::BackdropClick),
        "panel" => PreviewCommand::Act(UserAction::PanelClick),
        "refer" => PreviewCommand::Act(UserAction::ReferNow),
        "login" => PreviewCommand::Act(UserAction::ClientLogin),
        "terms" => PreviewCommand::Act(UserAction::ViewTerms),
        "terms-close" => PreviewCommand::Act(UserAction::CloseTerms),
        "terms-backdrop" => PreviewCommand::Act(UserAction::TermsBackdropClick),
        "terms-panel" => PreviewCommand::Act(UserAction::TermsPanelClick),
        "show" => PreviewCommand::Show,
        "quit" | "exit" => PreviewCommand::Quit,
        _ => return None,
    };
    Some(command)
}

pub async fn run(config: &FolioConfig) -> Result<()> {
    let settings = PopupSettings::from_config(&config.popup.clone().unwrap_or_default());
    let store = stores::key_value_store(config)?;
    let bus = SignalBus::new();

    let actions = PopupActions::new(
        || terminal_output::note_info("refer now: opening referral form"),
        || terminal_output::note_info("client login: redirecting to client portal"),
    );
    let popup = PopupController::new(settings, store, Arc::new(SystemClock), bus.clone())
        .with_actions(actions)
        .mount();

    terminal_output::note_info(&terminal_output::render_snapshot(&popup.snapshot()));
    terminal_output::note_info(HELP);

    // Print on every state change; the animation frames in between are skipped.
    let mut updates = popup.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_state = updates.borrow().state;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.state != last_state {
                last_state = snapshot.state;
                println!("{}", terminal_output::render_snapshot(&snapshot));
            }
        }
    });

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Some(PreviewCommand::Act(action)) => {
                popup.act(action).await?;
            }
            Some(PreviewCommand::Show) => {
                bus.publish(SiteSignal::ShowPopupRequest);
            }
            Some(PreviewCommand::Quit) => break,
            None => terminal_output::note_warn(&format!("unknown command `{}`; {HELP}", line.trim())),
        }
    }

    popup.unmount().await;
    printer.abort();
    Ok(())
}
