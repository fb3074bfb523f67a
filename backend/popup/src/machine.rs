//! Popup state machine.
//!
//! Pure and synchronous: every input returns the [`Effect`]s the driver has
//! to carry out (timers, persistence, callbacks, site events). Wall time is
//! passed in, never read.

use std::time::Duration;

use folio_logging::{DismissReason, ShowTrigger, SiteEvent};

use crate::animation::CounterAnimation;
use crate::cooldown::{auto_show_eligible, parse_last_seen};
use crate::settings::PopupSettings;
use crate::state::{AnimatedValues, PopupSnapshot, PopupState};

/// Something the user did to the mounted popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Close,
    /// Click on the scrim around the popup.
    BackdropClick,
    /// Click inside the popup panel.
    PanelClick,
    ReferNow,
    ClientLogin,
    ViewTerms,
    CloseTerms,
    TermsBackdropClick,
    TermsPanelClick,
}

/// Work requested by the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ScheduleAutoShow(Duration),
    CancelAutoShow,
    /// Start a fresh tick schedule and arm frame 0.
    StartAnimation,
    /// Arm the given frame on the current schedule.
    ArmFrame(u32),
    StopAnimation,
    PersistLastSeen(i64),
    NotifyReferNow,
    NotifyClientLogin,
    Emit(SiteEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Hidden,
    Animating,
    Visible,
}

#[derive(Debug)]
pub struct PopupMachine {
    settings: PopupSettings,
    animation: CounterAnimation,
    visibility: Visibility,
    terms_open: bool,
    values: AnimatedValues,
    /// Next frame the animation is waiting on.
    frame: u32,
    last_seen: Option<i64>,
    auto_show_pending: bool,
    dismissed_since_mount: bool,
}

impl PopupMachine {
    pub fn new(settings: PopupSettings) -> Self {
        let animation = CounterAnimation::new(settings.targets, settings.animation_steps);
        Self {
            settings,
            animation,
            visibility: Visibility::Hidden,
            terms_open: false,
            values: AnimatedValues::default(),
            frame: 0,
            last_seen: None,
            auto_show_pending: false,
            dismissed_since_mount: false,
        }
    }

    pub fn settings(&self) -> &PopupSettings {
        &self.settings
    }

    /// Mount with the raw persisted timestamp (if any).
    pub fn mount(&mut self, stored: Option<&str>, now_millis: i64) -> Vec<Effect> {
        self.last_seen = parse_last_seen(stored);
        if !auto_show_eligible(self.last_seen, now_millis, self.settings.cooldown) {
            return Vec::new();
        }
        self.auto_show_pending = true;
        vec![Effect::ScheduleAutoShow(self.settings.auto_show_delay)]
    }

    /// The post-mount delay ran out.
    pub fn auto_show_elapsed(&mut self) -> Vec<Effect> {
        if !std::mem::take(&mut self.auto_show_pending) {
            return Vec::new();
        }
        if self.visibility != Visibility::Hidden || self.dismissed_since_mount {
            return Vec::new();
        }
        self.show(ShowTrigger::Automatic)
    }

    /// A manual show request. Always opens, restarting the animation.
    pub fn show_requested(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if std::mem::take(&mut self.auto_show_pending) {
            effects.push(Effect::CancelAutoShow);
        }
        effects.extend(self.show(ShowTrigger::Manual));
        effects
    }

    /// Frame `frame` of the running animation is due.
    pub fn tick(&mut self, frame: u32) -> Vec<Effect> {
        if self.visibility != Visibility::Animating || frame != self.frame {
            return Vec::new();
        }
        self.values = self.animation.values_at(frame);
        if self.animation.is_last(frame) {
            self.visibility = Visibility::Visible;
            return vec![Effect::StopAnimation];
        }
        self.frame += 1;
        vec![Effect::ArmFrame(self.frame)]
    }

    pub fn apply(&mut self, action: UserAction, now_millis: i64) -> Vec<Effect> {
        if self.visibility == Visibility::Hidden {
            return Vec::new();
        }

        if self.terms_open {
            return match action {
                UserAction::CloseTerms | UserAction::TermsBackdropClick => {
                    self.terms_open = false;
                    vec![Effect::Emit(SiteEvent::TermsToggled { open: false })]
                }
                _ => Vec::new(),
            };
        }

        match action {
            UserAction::Close => self.dismiss(DismissReason::CloseButton, now_millis),
            UserAction::BackdropClick => self.dismiss(DismissReason::Backdrop, now_millis),
            UserAction::ReferNow => {
                let mut effects = self.dismiss(DismissReason::ReferNow, now_millis);
                effects.push(Effect::NotifyReferNow);
                effects
            }
            UserAction::ClientLogin => {
                let mut effects = self.dismiss(DismissReason::ClientLogin, now_millis);
                effects.push(Effect::NotifyClientLogin);
                effects
            }
            UserAction::ViewTerms => {
                self.terms_open = true;
                vec![Effect::Emit(SiteEvent::TermsToggled { open: true })]
            }
            UserAction::PanelClick
            | UserAction::CloseTerms
            | UserAction::TermsBackdropClick
            | UserAction::TermsPanelClick => Vec::new(),
        }
    }

    /// Drop pending timers on unmount.
    pub fn unmount(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if std::mem::take(&mut self.auto_show_pending) {
            effects.push(Effect::CancelAutoShow);
        }
        if self.visibility == Visibility::Animating {
            effects.push(Effect::StopAnimation);
        }
        effects
    }

    pub fn snapshot(&self) -> PopupSnapshot {
        let state = match (self.visibility, self.terms_open) {
            (Visibility::Hidden, _) => PopupState::Hidden,
            (_, true) => PopupState::ShowingTerms,
            (Visibility::Animating, false) => PopupState::Animating,
            (Visibility::Visible, false) => PopupState::Visible,
        };
        PopupSnapshot {
            state,
            is_visible: self.visibility != Visibility::Hidden,
            terms_open: self.terms_open,
            values: self.values,
            last_seen: self.last_seen,
        }
    }

    fn show(&mut self, trigger: ShowTrigger) -> Vec<Effect> {
        self.visibility = Visibility::Animating;
        self.values = AnimatedValues::default();
        self.frame = 0;
        vec![
            Effect::StartAnimation,
            Effect::Emit(SiteEvent::PopupShown { trigger }),
        ]
    }

    fn dismiss(&mut self, reason: DismissReason, now_millis: i64) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.visibility == Visibility::Animating {
            effects.push(Effect::StopAnimation);
        }
        self.visibility = Visibility::Hidden;
        self.terms_open = false;
        self.dismissed_since_mount = true;
        self.last_seen = Some(now_millis);
        effects.push(Effect::PersistLastSeen(now_millis));
        effects.push(Effect::Emit(SiteEvent::PopupDismissed {
            reason,
            at_millis: now_millis,
        }));
        effects
    }
}
