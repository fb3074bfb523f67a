use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Default buffer size for the signal channel.
const DEFAULT_BUFFER_SIZE: usize = 16;

/// Named, payload-free signals broadcast across the site process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteSignal {
    /// Force the referral popup open, bypassing its cool-down.
    ShowPopupRequest,
}

/// Publish/subscribe channel for [`SiteSignal`]s.
///
/// Cloning the bus yields another publisher on the same channel. Every
/// subscriber sees every signal published after it subscribed.
#[derive(Clone)]
pub struct SignalBus {
    sender: broadcast::Sender<SiteSignal>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer);
        Self { sender }
    }

    /// Emit a signal to all current subscribers. Returns how many received it.
    pub fn publish(&self, signal: SiteSignal) -> usize {
        match self.sender.send(signal) {
            Ok(receivers) => {
                debug!(?signal, receivers, "Signal published");
                receivers
            }
            Err(_) => {
                debug!(?signal, "Signal published with no subscribers");
                0
            }
        }
    }

    /// Register a new listener. Dropping the subscription unregisters it.
    pub fn subscribe(&self) -> SignalSubscription {
        SignalSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration on a [`SignalBus`].
pub struct SignalSubscription {
    receiver: broadcast::Receiver<SiteSignal>,
}

impl SignalSubscription {
    /// Wait for the next signal. Returns `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<SiteSignal> {
        loop {
            match self.receiver.recv().await {
                Ok(signal) => return Some(signal),
                Err(RecvError::Lagged(skipped)) => {
                    // Signals carry no payload, so the retained ones stand in for the skipped.
                    warn!(skipped, "Signal subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
