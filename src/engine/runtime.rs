// src/engine/runtime.rs

use std::fmt;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::Builder;
use crate::freshness::FreshnessPublisher;
use crate::watch::{WatchEvent, WatcherHandle};

use super::core::{CoreCommand, WatchCore};

/// Drives the [`WatchCore`] in response to watcher events, runs the builds
/// it asks for and publishes freshness signals.
///
/// This is a pure IO shell around the core: reading events from channels,
/// invoking the builder, writing to the freshness channel. Builds run
/// inline, so they are strictly sequential.
pub struct WatchLoop {
    core: WatchCore,
    builder: Builder,
    events: mpsc::UnboundedReceiver<WatchEvent>,
    publisher: FreshnessPublisher,
    stop_rx: oneshot::Receiver<()>,
    watcher: Option<WatcherHandle>,
}

impl fmt::Debug for WatchLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchLoop")
            .field("core", &self.core)
            .field("builder", &self.builder)
            .field("watcher", &self.watcher)
            .finish_non_exhaustive()
    }
}

impl WatchLoop {
    /// `stop_rx` ends the loop when it fires or when its sender is dropped.
    pub fn new(
        core: WatchCore,
        builder: Builder,
        events: mpsc::UnboundedReceiver<WatchEvent>,
        publisher: FreshnessPublisher,
        stop_rx: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            core,
            builder,
            events,
            publisher,
            stop_rx,
            watcher: None,
        }
    }

    /// Hand ownership of the filesystem watcher to the loop; it is released
    /// when the loop exits.
    pub fn with_watcher(mut self, watcher: WatcherHandle) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Main event loop.
    ///
    /// Ends with `Ok(())` when the event channel closes or a stop is
    /// requested, and with the error for fatal core failures
    /// (`InvariantViolation`).
    pub async fn run(mut self) -> Result<()> {
        info!(
            files = self.core.files().len(),
            state = ?self.core.state(),
            "watch loop started"
        );

        let result = loop {
            let event = tokio::select! {
                event = self.events.recv() => event,
                _ = &mut self.stop_rx => {
                    info!("stop requested");
                    None
                }
            };

            let Some(event) = event else {
                debug!("watch event channel closed");
                break Ok(());
            };

            let step = match self.core.step(event) {
                Ok(step) => step,
                Err(err) => break Err(err),
            };

            for command in step.commands {
                self.execute_command(command).await;
            }
        };

        self.core.stop();
        // Release the watcher before reporting.
        drop(self.watcher.take());
        info!(state = ?self.core.state(), "watch loop exiting");
        result
    }

    async fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::Rebuild => {
                // A failed build still publishes: pollers learn that something
                // changed and can reload into the new error state.
                let status = self.builder.build_and_report().await;
                let signal = self.core.rebuilt(status);
                self.publisher.publish(signal).await;
            }
        }
    }
}
