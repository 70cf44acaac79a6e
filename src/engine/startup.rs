// src/engine/startup.rs

//! Engine lifecycle: `Starting → Building(initial) → Watching`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

use crate::discover::discover;
use crate::errors::{FreshError, Result};
use crate::exec::{Builder, Toolchain};
use crate::freshness::FreshnessPublisher;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{BuildStatus, BuildTarget};
use crate::watch::{spawn_file_watcher, Digest, FileMap};

use super::core::WatchCore;
use super::runtime::WatchLoop;
use super::EngineState;

/// Not-yet-started freshness engine for one build target.
pub struct Engine {
    toolchain: Arc<dyn Toolchain>,
    fs: Arc<dyn FileSystem>,
    target: PathBuf,
    flags: Vec<String>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("target", &self.target)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(toolchain: Arc<dyn Toolchain>, target: impl Into<PathBuf>, flags: Vec<String>) -> Self {
        Self {
            toolchain,
            fs: Arc::new(RealFileSystem),
            target: target.into(),
            flags,
        }
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Run the startup phase and spawn the watch loop.
    ///
    /// The initial build may fail without aborting startup. Target
    /// resolution, discovery, hashing and watcher registration errors are
    /// returned before anything is spawned.
    pub async fn start(self, publisher: FreshnessPublisher) -> Result<RunningEngine> {
        info!(state = ?EngineState::Starting, build_target = %self.target.display(), "starting engine");
        let target = BuildTarget::resolve(&self.target, self.flags)?;
        let builder = Builder::new(Arc::clone(&self.toolchain), target.clone());

        info!(state = ?EngineState::Building, "initial build");
        let initial_build = builder.build_and_report().await;

        let files = discover(Arc::clone(&self.toolchain), target.path()).await?;
        let file_map = hash_files(Arc::clone(&self.fs), files).await?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let watcher = spawn_file_watcher(
            file_map.paths().map(Path::to_path_buf).collect::<Vec<_>>(),
            event_tx,
        )?;

        let initial_digest = file_map.total_digest();
        let tracked_files = file_map.len();
        info!(
            state = ?EngineState::Watching,
            files = tracked_files,
            digest = %initial_digest,
            "watching files"
        );

        let (stop_tx, stop_rx) = oneshot::channel();
        let core = WatchCore::new(self.fs, file_map);
        let watch_loop =
            WatchLoop::new(core, builder, event_rx, publisher, stop_rx).with_watcher(watcher);
        let handle = tokio::spawn(watch_loop.run());

        Ok(RunningEngine {
            handle,
            stop_tx: Some(stop_tx),
            target,
            initial_digest,
            tracked_files,
            initial_build,
        })
    }
}

/// Hash every discovered file off the async worker threads.
async fn hash_files(fs: Arc<dyn FileSystem>, files: BTreeSet<PathBuf>) -> Result<FileMap> {
    tokio::task::spawn_blocking(move || FileMap::build(fs.as_ref(), files))
        .await
        .map_err(|e| FreshError::Other(anyhow!("hashing task failed: {e}")))?
}

/// Handle to a started engine.
///
/// Dropping it stops the watch loop; use [`RunningEngine::wait`] to keep the
/// loop running until it ends on its own.
#[derive(Debug)]
pub struct RunningEngine {
    handle: JoinHandle<Result<()>>,
    stop_tx: Option<oneshot::Sender<()>>,
    target: BuildTarget,
    initial_digest: Digest,
    tracked_files: usize,
    initial_build: BuildStatus,
}

impl RunningEngine {
    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// Aggregate digest of the file map right after startup.
    pub fn initial_digest(&self) -> Digest {
        self.initial_digest
    }

    pub fn tracked_files(&self) -> usize {
        self.tracked_files
    }

    pub fn initial_build(&self) -> BuildStatus {
        self.initial_build
    }

    /// Ask the loop to stop and wait for it to release the watcher.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        flatten(self.handle.await)
    }

    /// Wait until the loop ends by itself (watcher closed or fatal error).
    pub async fn wait(self) -> Result<()> {
        let RunningEngine {
            handle,
            stop_tx: _stop_tx,
            ..
        } = self;
        flatten(handle.await)
    }

    /// Run until the loop ends or `shutdown` resolves, whichever is first.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::select! {
            joined = &mut self.handle => return flatten(joined),
            () = shutdown => {}
        }
        self.stop().await
    }
}

fn flatten(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    joined.map_err(|e| FreshError::Other(anyhow!("watch loop task failed: {e}")))?
}
