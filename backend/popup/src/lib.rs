//! Referral popup engagement controller.
//!
//! [`PopupMachine`] holds every rule about when the popup opens and closes
//! and returns [`Effect`]s; [`PopupController`] runs it on a tokio task with
//! the timers, the persisted cool-down and the manual show signal.

pub mod animation;
pub mod controller;
pub mod cooldown;
pub mod machine;
pub mod settings;
pub mod state;

pub use animation::{frame_value, CounterAnimation};
pub use controller::{PopupActions, PopupController, PopupHandle};
pub use cooldown::{auto_show_eligible, parse_last_seen};
pub use machine::{Effect, PopupMachine, UserAction};
pub use settings::PopupSettings;
pub use state::{AnimatedValues, PopupSnapshot, PopupState};
