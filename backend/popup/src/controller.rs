//! Async popup controller.
//!
//! One tokio task per mounted popup owns the [`PopupMachine`], both timers
//! and the signal subscription. Inputs are handled one at a time from a
//! single `select!` loop, so the machine needs no locking.

use std::fmt;
use std::future::pending;
use std::sync::Arc;

use folio_core::{FolioError, KeyValueStore, SignalBus, SignalSubscription, SiteSignal};
use folio_logging::SiteEventLogger;
use folio_scheduler::{Clock, TickSchedule, Timer};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::machine::{Effect, PopupMachine, UserAction};
use crate::settings::PopupSettings;
use crate::state::PopupSnapshot;

const COMMAND_BUFFER: usize = 32;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Collaborators notified after the popup closes on an outbound action.
#[derive(Clone)]
pub struct PopupActions {
    on_refer_now: Callback,
    on_client_login: Callback,
}

impl PopupActions {
    pub fn new(
        on_refer_now: impl Fn() + Send + Sync + 'static,
        on_client_login: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_refer_now: Arc::new(on_refer_now),
            on_client_login: Arc::new(on_client_login),
        }
    }
}

impl Default for PopupActions {
    fn default() -> Self {
        Self::new(|| {}, || {})
    }
}

impl fmt::Debug for PopupActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupActions").finish_non_exhaustive()
    }
}

enum Command {
    Act {
        action: UserAction,
        ack: oneshot::Sender<PopupSnapshot>,
    },
    Unmount,
}

/// Everything needed to mount a popup.
pub struct PopupController {
    settings: PopupSettings,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    bus: SignalBus,
    actions: PopupActions,
}

impl PopupController {
    pub fn new(
        settings: PopupSettings,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        bus: SignalBus,
    ) -> Self {
        Self {
            settings,
            store,
            clock,
            bus,
            actions: PopupActions::default(),
        }
    }

    pub fn with_actions(mut self, actions: PopupActions) -> Self {
        self.actions = actions;
        self
    }

    /// Read the persisted cool-down, subscribe to show requests and start
    /// the controller task. Must be called inside a tokio runtime.
    pub fn mount(self) -> PopupHandle {
        let signals = self.bus.subscribe();
        let key = self.settings.storage_key.clone();

        let stored = match self.store.get(&key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read popup state; treating as first visit");
                None
            }
        };

        let mut machine = PopupMachine::new(self.settings);
        let effects = machine.mount(stored.as_deref(), self.clock.now_millis());
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);

        let mut task = PopupTask {
            machine,
            store: self.store,
            clock: self.clock,
            actions: self.actions,
            signals,
            signals_open: true,
            commands: command_rx,
            snapshots: snapshot_tx,
            auto_show: None,
            schedule: None,
            frame_timer: None,
        };
        task.run_effects(effects);

        info!(key = %key, "Popup controller mounted");
        let join = tokio::spawn(task.run());

        PopupHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task: join,
        }
    }
}

/// Handle to a mounted popup.
pub struct PopupHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<PopupSnapshot>,
    task: JoinHandle<()>,
}

impl PopupHandle {
    /// Apply a user action and wait for the resulting snapshot.
    pub async fn act(&self, action: UserAction) -> Result<PopupSnapshot, FolioError> {
        let (ack, done) = oneshot::channel();
        self.commands
            .send(Command::Act { action, ack })
            .await
            .map_err(|_| FolioError::ChannelClosed("popup controller".into()))?;
        done.await
            .map_err(|_| FolioError::ChannelClosed("popup controller".into()))
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> PopupSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<PopupSnapshot> {
        self.snapshots.clone()
    }

    /// Cancel timers, drop the signal subscription and wait for the task.
    pub async fn unmount(self) {
        // A send error means the task is already gone.
        let _ = self.commands.send(Command::Unmount).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "Popup controller task ended abnormally");
        }
    }
}

struct PopupTask {
    machine: PopupMachine,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    actions: PopupActions,
    signals: SignalSubscription,
    signals_open: bool,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<PopupSnapshot>,
    auto_show: Option<Timer>,
    schedule: Option<TickSchedule>,
    frame_timer: Option<(u32, Timer)>,
}

impl PopupTask {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Act { action, ack }) => {
                        let effects = self.machine.apply(action, self.clock.now_millis());
                        self.run_effects(effects);
                        // The caller may have stopped waiting.
                        let _ = ack.send(self.machine.snapshot());
                    }
                    Some(Command::Unmount) | None => break,
                },
                signal = self.signals.recv(), if self.signals_open => match signal {
                    Some(SiteSignal::ShowPopupRequest) => {
                        debug!("Manual popup show requested");
                        let effects = self.machine.show_requested();
                        self.run_effects(effects);
                    }
                    None => {
                        debug!("Signal bus closed");
                        self.signals_open = false;
                    }
                },
                _ = wait_on(&mut self.auto_show) => {
                    self.auto_show = None;
                    let effects = self.machine.auto_show_elapsed();
                    self.run_effects(effects);
                }
                frame = next_frame(&mut self.frame_timer) => {
                    self.frame_timer = None;
                    let effects = self.machine.tick(frame);
                    self.run_effects(effects);
                }
            }
        }

        let effects = self.machine.unmount();
        self.run_effects(effects);
        info!("Popup controller unmounted");
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        for effect in effects {
            match effect {
                Effect::ScheduleAutoShow(delay) => {
                    self.auto_show = Some(self.clock.sleep(delay));
                }
                Effect::CancelAutoShow => self.auto_show = None,
                Effect::StartAnimation => {
                    let settings = self.machine.settings();
                    let schedule = TickSchedule::new(
                        self.clock.instant(),
                        settings.animation_duration,
                        settings.animation_steps,
                    );
                    self.frame_timer = Some((0, self.clock.sleep_until(schedule.deadline(0))));
                    self.schedule = Some(schedule);
                }
                Effect::ArmFrame(frame) => {
                    if let Some(schedule) = &self.schedule {
                        self.frame_timer =
                            Some((frame, self.clock.sleep_until(schedule.deadline(frame))));
                    }
                }
                Effect::StopAnimation => {
                    self.frame_timer = None;
                    self.schedule = None;
                }
                Effect::PersistLastSeen(at) => {
                    let key = &self.machine.settings().storage_key;
                    if let Err(e) = self.store.set(key, &at.to_string()) {
                        warn!(key = %key, error = %e, "Failed to persist popup dismissal");
                    }
                }
                Effect::NotifyReferNow => {
                    self.publish();
                    (self.actions.on_refer_now)();
                }
                Effect::NotifyClientLogin => {
                    self.publish();
                    (self.actions.on_client_login)();
                }
                Effect::Emit(event) => SiteEventLogger::log_event(event),
            }
        }
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.machine.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

async fn wait_on(timer: &mut Option<Timer>) {
    match timer {
        Some(timer) => timer.await,
        None => pending().await,
    }
}

async fn next_frame(armed: &mut Option<(u32, Timer)>) -> u32 {
    match armed {
        Some((frame, timer)) => {
            timer.await;
            *frame
        }
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use folio_scheduler::VirtualClock;
    use folio_storage::InMemoryKeyValueStore;
    use tokio::time::sleep;

    use super::*;
    use crate::state::{AnimatedValues, PopupState};

    const START: i64 = 1_700_000_000_000;
    const KEY: &str = "referral_popup_last_seen";

    struct Fixture {
        store: Arc<InMemoryKeyValueStore>,
        clock: Arc<VirtualClock>,
        bus: SignalBus,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: Arc::new(InMemoryKeyValueStore::new()),
                clock: Arc::new(VirtualClock::starting_at(START)),
                bus: SignalBus::new(),
            }
        }

        fn controller(&self) -> PopupController {
            PopupController::new(
                PopupSettings::default(),
                self.store.clone(),
                self.clock.clone(),
                self.bus.clone(),
            )
        }

        fn mount(&self) -> PopupHandle {
            self.controller().mount()
        }

        fn stored(&self) -> Option<String> {
            self.store.get(KEY).unwrap()
        }
    }

    /// Lets the controller task catch up without moving time.
    async fn settle() {
        sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_session_auto_shows_after_delay() {
        let fx = Fixture::new();
        let popup = fx.mount();

        sleep(Duration::from_millis(2_999)).await;
        assert_eq!(popup.snapshot().state, PopupState::Hidden);

        sleep(Duration::from_millis(2)).await;
        let snapshot = popup.snapshot();
        assert_eq!(snapshot.state, PopupState::Animating);
        assert!(snapshot.is_visible);

        sleep(Duration::from_millis(2_100)).await;
        let snapshot = popup.snapshot();
        assert_eq!(snapshot.state, PopupState::Visible);
        assert_eq!(
            snapshot.values,
            AnimatedValues {
                reward: 500,
                discount_percent: 25,
                max_earning: 5_000
            }
        );
        // Showing never writes the cool-down.
        assert_eq!(fx.stored(), None);

        popup.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_suppresses_auto_but_not_manual() {
        let fx = Fixture::new();
        let seen = START - 60 * 60 * 1000;
        fx.store.set(KEY, &seen.to_string()).unwrap();
        let popup = fx.mount();

        sleep(Duration::from_secs(10)).await;
        assert_eq!(popup.snapshot().state, PopupState::Hidden);

        assert_eq!(fx.bus.publish(SiteSignal::ShowPopupRequest), 1);
        settle().await;
        let snapshot = popup.snapshot();
        assert!(snapshot.is_visible);
        assert_eq!(snapshot.last_seen, Some(seen));
        assert_eq!(fx.stored(), Some(seen.to_string()));

        popup.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismissal_persists_and_blocks_remount() {
        let fx = Fixture::new();
        let popup = fx.mount();
        sleep(Duration::from_millis(3_500)).await;

        let snapshot = popup.act(UserAction::Close).await.unwrap();
        let now = fx.clock.now_millis();
        assert_eq!(snapshot.state, PopupState::Hidden);
        assert_eq!(snapshot.last_seen, Some(now));
        assert_eq!(fx.stored(), Some(now.to_string()));
        popup.unmount().await;

        fx.clock.advance_wall(Duration::from_secs(23 * 60 * 60));
        let popup = fx.mount();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(popup.snapshot().state, PopupState::Hidden);
        popup.unmount().await;

        fx.clock.advance_wall(Duration::from_secs(2 * 60 * 60));
        let popup = fx.mount();
        sleep(Duration::from_secs(6)).await;
        assert_eq!(popup.snapshot().state, PopupState::Visible);
        popup.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_backdrop_closes_and_panel_does_not() {
        let fx = Fixture::new();
        let popup = fx.mount();
        sleep(Duration::from_secs(6)).await;

        let snapshot = popup.act(UserAction::PanelClick).await.unwrap();
        assert_eq!(snapshot.state, PopupState::Visible);
        assert_eq!(fx.stored(), None);

        let snapshot = popup.act(UserAction::BackdropClick).await.unwrap();
        assert_eq!(snapshot.state, PopupState::Hidden);
        assert_eq!(fx.stored(), Some(fx.clock.now_millis().to_string()));

        popup.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refer_now_closes_then_notifies() {
        let fx = Fixture::new();
        let referred = Arc::new(Mutex::new(None));
        let logins = Arc::new(AtomicUsize::new(0));

        let seen_by_callback = referred.clone();
        let store = fx.store.clone();
        let login_count = logins.clone();
        let actions = PopupActions::new(
            move || {
                *seen_by_callback.lock().unwrap() = store.get(KEY).unwrap();
            },
            move || {
                login_count.fetch_add(1, Ordering::SeqCst);
            },
        );
        let popup = fx.controller().with_actions(actions).mount();
        sleep(Duration::from_secs(4)).await;

        let snapshot = popup.act(UserAction::ReferNow).await.unwrap();
        assert_eq!(snapshot.state, PopupState::Hidden);
        // Persisted before the collaborator ran.
        assert_eq!(
            *referred.lock().unwrap(),
            Some(fx.clock.now_millis().to_string())
        );
        assert_eq!(logins.load(Ordering::SeqCst), 0);

        popup.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_terms_overlay_does_not_touch_cooldown() {
        let fx = Fixture::new();
        let popup = fx.mount();
        sleep(Duration::from_secs(6)).await;

        let snapshot = popup.act(UserAction::ViewTerms).await.unwrap();
        assert_eq!(snapshot.state, PopupState::ShowingTerms);
        assert!(snapshot.is_visible);

        let snapshot = popup.act(UserAction::Close).await.unwrap();
        assert_eq!(snapshot.state, PopupState::ShowingTerms);

        let snapshot = popup.act(UserAction::CloseTerms).await.unwrap();
        assert_eq!(snapshot.state, PopupState::Visible);
        assert_eq!(fx.stored(), None);

        popup.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_show_cancels_pending_auto_show() {
        let fx = Fixture::new();
        let popup = fx.mount();

        sleep(Duration::from_secs(1)).await;
        fx.bus.publish(SiteSignal::ShowPopupRequest);
        settle().await;
        assert!(popup.snapshot().is_visible);

        popup.act(UserAction::Close).await.unwrap();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(popup.snapshot().state, PopupState::Hidden);

        popup.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_while_open_restarts_animation() {
        let fx = Fixture::new();
        let popup = fx.mount();
        sleep(Duration::from_secs(6)).await;
        assert_eq!(popup.snapshot().values.reward, 500);

        fx.bus.publish(SiteSignal::ShowPopupRequest);
        settle().await;
        let snapshot = popup.snapshot();
        assert_eq!(snapshot.state, PopupState::Animating);
        assert!(snapshot.values.reward < 500);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(popup.snapshot().values.reward, 500);

        popup.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_drops_subscription() {
        let fx = Fixture::new();
        let popup = fx.mount();
        assert_eq!(fx.bus.subscriber_count(), 1);

        popup.unmount().await;
        assert_eq!(fx.bus.subscriber_count(), 0);
        assert_eq!(fx.bus.publish(SiteSignal::ShowPopupRequest), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_stored_value_is_first_visit() {
        let fx = Fixture::new();
        fx.store.set(KEY, "not-a-timestamp").unwrap();
        let popup = fx.mount();

        sleep(Duration::from_secs(4)).await;
        assert!(popup.snapshot().is_visible);
        popup.unmount().await;
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, FolioError> {
            Err(FolioError::Storage("disk unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), FolioError> {
            Err(FolioError::Storage("disk unavailable".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_storage_errors_are_not_fatal() {
        let clock = Arc::new(VirtualClock::starting_at(START));
        let popup = PopupController::new(
            PopupSettings::default(),
            Arc::new(BrokenStore),
            clock,
            SignalBus::new(),
        )
        .mount();

        sleep(Duration::from_secs(4)).await;
        assert!(popup.snapshot().is_visible);

        let snapshot = popup.act(UserAction::Close).await.unwrap();
        assert_eq!(snapshot.state, PopupState::Hidden);
        popup.unmount().await;
    }
}
