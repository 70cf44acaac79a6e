// src/watch/watcher.rs

use std::path::PathBuf;

use notify::event::EventKind;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::{FreshError, Result};

/// Event forwarded from the notify thread into the watch loop.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A tracked file was written, created, renamed or removed.
    Changed { path: PathBuf, kind: EventKind },
    /// The watch backend reported an internal error.
    Error(String),
}

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching and, once the last sender is gone, closes the event
/// channel.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    watched: usize,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("watched", &self.watched)
            .finish()
    }
}

/// Start watching every path in `paths` (one non-recursive watch each) and
/// forward events into `event_tx`.
///
/// Access-only events (open/close without a write) are dropped here; they
/// never change content.
pub fn spawn_file_watcher<I>(
    paths: I,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
) -> Result<WatcherHandle>
where
    I: IntoIterator<Item = PathBuf>,
{
    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            let events = match res {
                Ok(event) if matches!(event.kind, EventKind::Access(_)) => return,
                Ok(event) => event
                    .paths
                    .into_iter()
                    .map(|path| WatchEvent::Changed {
                        path,
                        kind: event.kind,
                    })
                    .collect(),
                Err(err) => vec![WatchEvent::Error(err.to_string())],
            };
            for event in events {
                if event_tx.send(event).is_err() {
                    debug!("watch loop gone; dropping notify event");
                    return;
                }
            }
        },
        Config::default(),
    )?;

    let mut watched = 0;
    for path in paths {
        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|e| FreshError::Watcher(format!("watching {:?}: {e}", path)))?;
        watched += 1;
    }

    info!(files = watched, "file watcher started");

    Ok(WatcherHandle {
        _inner: watcher,
        watched,
    })
}
