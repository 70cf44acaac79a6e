// src/freshness/channel.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::types::BuildStatus;
use crate::watch::Digest;

/// Default number of signals buffered between the watch loop and pollers.
pub const DEFAULT_CAPACITY: usize = 20;

/// Default time a poll waits for a signal before reporting a timeout.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(20);

/// Aggregate digest published after a rebuild attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessSignal {
    pub digest: Digest,
    pub build: BuildStatus,
}

/// Outcome of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult {
    Fresh(FreshnessSignal),
    Timeout,
    Closed,
}

/// Create a bounded freshness channel owned by one engine instance.
pub fn freshness_channel(
    capacity: usize,
    poll_timeout: Duration,
) -> (FreshnessPublisher, FreshnessReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let rx = Arc::new(Mutex::new(rx));
    (
        FreshnessPublisher {
            tx,
            rx: Arc::clone(&rx),
        },
        FreshnessReceiver { rx, poll_timeout },
    )
}

/// Producer side, held by the watch loop.
///
/// Dropping it closes the channel; pending and future polls then report
/// [`PollResult::Closed`] once the buffer is drained.
#[derive(Debug)]
pub struct FreshnessPublisher {
    tx: mpsc::Sender<FreshnessSignal>,
    // Used only to evict the oldest signal when the buffer is full.
    rx: Arc<Mutex<mpsc::Receiver<FreshnessSignal>>>,
}

impl FreshnessPublisher {
    /// Queue a signal without ever blocking on slow pollers.
    ///
    /// When the buffer is full the oldest queued signal is dropped.
    pub async fn publish(&self, signal: FreshnessSignal) {
        let mut pending = signal;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => {
                    debug!(digest = %signal.digest, build = ?signal.build, "published freshness signal");
                    return;
                }
                Err(TrySendError::Full(returned)) => {
                    pending = returned;
                    let mut rx = self.rx.lock().await;
                    if let Ok(evicted) = rx.try_recv() {
                        warn!(digest = %evicted.digest, "freshness buffer full; dropped oldest signal");
                    }
                }
                Err(TrySendError::Closed(_)) => return,
            }
        }
    }
}

/// Consumer side, cloned into every HTTP request handler.
///
/// All clones share one queue: each signal is delivered to exactly one poll.
#[derive(Debug, Clone)]
pub struct FreshnessReceiver {
    rx: Arc<Mutex<mpsc::Receiver<FreshnessSignal>>>,
    poll_timeout: Duration,
}

impl FreshnessReceiver {
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    /// Wait for the next signal, up to the poll timeout.
    pub async fn poll(&self) -> PollResult {
        let next = async { self.rx.lock().await.recv().await };
        match tokio::time::timeout(self.poll_timeout, next).await {
            Ok(Some(signal)) => PollResult::Fresh(signal),
            Ok(None) => PollResult::Closed,
            Err(_elapsed) => PollResult::Timeout,
        }
    }
}
