// src/engine/core.rs

//! Pure watch-loop state machine.
//!
//! `WatchCore` consumes one [`WatchEvent`] at a time and decides whether a
//! rebuild is needed. It owns the [`FileMap`] and only touches the outside
//! world through the [`FileSystem`] trait (canonicalize + re-hash), so it
//! can be driven in tests with a mock filesystem and no Tokio, channels or
//! processes.
//!
//! The async shell (`engine::runtime::WatchLoop`) reads events, runs the
//! builds the core asks for and publishes the resulting signal.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::EngineState;
use crate::errors::{FreshError, Result};
use crate::freshness::FreshnessSignal;
use crate::fs::FileSystem;
use crate::types::BuildStatus;
use crate::watch::{digest_file, Digest, FileMap, WatchEvent};

/// What a change event turned out to mean for a tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// New contents hash to the empty-input digest; treated as a transient
    /// mid-save state and ignored.
    IgnoredEmpty,
    /// Contents identical to the stored digest.
    Unchanged,
    /// File could not be re-read (e.g. removed mid-save); ignored.
    Unreadable,
    /// Contents changed; the stored digest was updated.
    Changed { previous: Digest, current: Digest },
}

/// Command produced by the core, to be executed by the async shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    Rebuild,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub outcome: Option<ChangeOutcome>,
}

impl CoreStep {
    fn idle(outcome: Option<ChangeOutcome>) -> Self {
        Self {
            commands: Vec::new(),
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct WatchCore {
    fs: Arc<dyn FileSystem>,
    files: FileMap,
    state: EngineState,
}

impl WatchCore {
    pub fn new(fs: Arc<dyn FileSystem>, files: FileMap) -> Self {
        Self {
            fs,
            files,
            state: EngineState::Watching,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn files(&self) -> &FileMap {
        &self.files
    }

    pub fn total_digest(&self) -> Digest {
        self.files.total_digest()
    }

    /// Handle one event from the watcher.
    ///
    /// Returns `Err(InvariantViolation)` for a change to a path that was never
    /// registered; every other outcome keeps the loop alive.
    pub fn step(&mut self, event: WatchEvent) -> Result<CoreStep> {
        match event {
            WatchEvent::Changed { path, kind } => {
                debug!(path = %path.display(), ?kind, "change event");
                let outcome = self.on_change(&path)?;
                if let ChangeOutcome::Changed { .. } = outcome {
                    self.state = EngineState::Rebuilding;
                    return Ok(CoreStep {
                        commands: vec![CoreCommand::Rebuild],
                        outcome: Some(outcome),
                    });
                }
                Ok(CoreStep::idle(Some(outcome)))
            }
            WatchEvent::Error(err) => {
                warn!("got a watcher error: {err}");
                Ok(CoreStep::idle(None))
            }
        }
    }

    /// Re-hash a changed path and update the file map if its content moved.
    pub fn on_change(&mut self, raw: &Path) -> Result<ChangeOutcome> {
        // The file may be briefly missing during an atomic save; fall back to
        // the reported path, which is already canonical for tracked files.
        let path = self
            .fs
            .canonicalize(raw)
            .unwrap_or_else(|_| raw.to_path_buf());

        let Some(stored) = self.files.get(&path) else {
            return Err(FreshError::InvariantViolation(path));
        };

        let current = match digest_file(self.fs.as_ref(), &path) {
            Ok(d) => d,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not re-hash changed file; ignoring");
                return Ok(ChangeOutcome::Unreadable);
            }
        };

        if current.is_empty_input() {
            debug!(path = %path.display(), "file is empty; ignoring until it has content");
            return Ok(ChangeOutcome::IgnoredEmpty);
        }
        if current == stored {
            debug!(path = %path.display(), "content unchanged");
            return Ok(ChangeOutcome::Unchanged);
        }

        info!(path = %path.display(), "file changed");
        self.files.update(path, current);
        Ok(ChangeOutcome::Changed {
            previous: stored,
            current,
        })
    }

    /// Close a rebuild: back to watching, with the signal to publish.
    pub fn rebuilt(&mut self, build: BuildStatus) -> FreshnessSignal {
        self.state = EngineState::Watching;
        FreshnessSignal {
            digest: self.files.total_digest(),
            build,
        }
    }

    pub fn stop(&mut self) {
        self.state = EngineState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use notify::event::{DataChange, EventKind, ModifyKind};
    use std::path::PathBuf;

    const MAIN: &str = "/app/main.go";
    const UTIL: &str = "/lib/util.go";

    fn core_with(fs: &MockFileSystem) -> WatchCore {
        fs.add_file(MAIN, "package main");
        fs.add_file(UTIL, "package lib");
        let files = FileMap::build(fs, [MAIN, UTIL]).unwrap();
        WatchCore::new(Arc::new(fs.clone()), files)
    }

    fn changed(path: &str) -> WatchEvent {
        WatchEvent::Changed {
            path: PathBuf::from(path),
            kind: EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        }
    }

    #[test]
    fn content_change_requests_rebuild() {
        let fs = MockFileSystem::new();
        let mut core = core_with(&fs);
        let before = core.total_digest();

        fs.add_file(MAIN, "package main // edited");
        let step = core.step(changed(MAIN)).unwrap();

        assert_eq!(step.commands, vec![CoreCommand::Rebuild]);
        assert_eq!(core.state(), EngineState::Rebuilding);
        assert_eq!(
            core.files().get(Path::new(MAIN)),
            Some(Digest::of(b"package main // edited"))
        );

        let signal = core.rebuilt(BuildStatus::Succeeded);
        assert_eq!(core.state(), EngineState::Watching);
        assert_ne!(signal.digest, before);
    }

    #[test]
    fn empty_file_never_triggers_or_updates() {
        let fs = MockFileSystem::new();
        let mut core = core_with(&fs);

        fs.add_file(MAIN, "");
        let step = core.step(changed(MAIN)).unwrap();

        assert!(step.commands.is_empty());
        assert_eq!(step.outcome, Some(ChangeOutcome::IgnoredEmpty));
        assert_eq!(
            core.files().get(Path::new(MAIN)),
            Some(Digest::of(b"package main"))
        );
        assert_eq!(core.state(), EngineState::Watching);
    }

    #[test]
    fn identical_content_is_a_no_op() {
        let fs = MockFileSystem::new();
        let mut core = core_with(&fs);
        let before = core.total_digest();

        fs.add_file(UTIL, "package lib");
        let step = core.step(changed(UTIL)).unwrap();

        assert!(step.commands.is_empty());
        assert_eq!(step.outcome, Some(ChangeOutcome::Unchanged));
        assert_eq!(core.total_digest(), before);
    }

    #[test]
    fn untracked_path_is_an_invariant_violation() {
        let fs = MockFileSystem::new();
        let mut core = core_with(&fs);
        fs.add_file("/elsewhere/x.go", "package x");

        let err = core.step(changed("/elsewhere/x.go")).unwrap_err();
        assert!(matches!(err, FreshError::InvariantViolation(p) if p == Path::new("/elsewhere/x.go")));
        assert!(FreshError::InvariantViolation(PathBuf::new()).is_fatal());
    }

    #[test]
    fn removed_file_is_ignored() {
        let fs = MockFileSystem::new();
        let mut core = core_with(&fs);

        fs.remove_file(MAIN);
        let step = core.step(changed(MAIN)).unwrap();

        assert!(step.commands.is_empty());
        assert_eq!(step.outcome, Some(ChangeOutcome::Unreadable));
    }

    #[test]
    fn watcher_errors_are_absorbed() {
        let fs = MockFileSystem::new();
        let mut core = core_with(&fs);

        let step = core.step(WatchEvent::Error("inotify queue overflow".into())).unwrap();
        assert!(step.commands.is_empty());
        assert_eq!(core.state(), EngineState::Watching);
    }
}
