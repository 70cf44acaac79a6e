// src/discover.rs

//! Dependency discovery.
//!
//! Resolves a build target into every source file its build graph depends
//! on:
//! 1. the target's own package files;
//! 2. the files of every transitive dependency package, queried
//!    concurrently (one task per package).
//!
//! Each sub-query returns its own file list and the lists are merged after
//! all tasks have joined. A single failing sub-query fails the whole
//! discovery; the remaining tasks are aborted.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::errors::{FreshError, Result};
use crate::exec::Toolchain;

pub async fn discover(toolchain: Arc<dyn Toolchain>, target: &Path) -> Result<BTreeSet<PathBuf>> {
    let started = Instant::now();

    let own = toolchain.list_package(&target.to_string_lossy()).await?;
    debug!(dir = %own.dir.display(), files = own.files.len(), "target package listed");

    let deps = toolchain.list_deps(target).await?;
    debug!(packages = deps.len(), "dependency packages listed");

    let mut tasks = JoinSet::new();
    for package in deps {
        let toolchain = Arc::clone(&toolchain);
        tasks.spawn(async move {
            toolchain
                .list_package(&package)
                .await
                .map(|pkg| pkg.paths())
                .map_err(|err| match err {
                    FreshError::Discovery(msg) => {
                        FreshError::Discovery(format!("package {package}: {msg}"))
                    }
                    other => other,
                })
        });
    }

    let mut per_package = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let files = joined
            .map_err(|e| FreshError::Discovery(format!("dependency query task failed: {e}")))??;
        per_package.push(files);
    }

    let files: BTreeSet<PathBuf> = own
        .paths()
        .into_iter()
        .chain(per_package.into_iter().flatten())
        .collect();

    info!(
        files = files.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "discovered build dependencies"
    );
    Ok(files)
}
