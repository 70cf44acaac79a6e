// src/exec/builder.rs

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::errors::Result;
use crate::exec::backend::{BuildOutput, Toolchain};
use crate::types::{BuildStatus, BuildTarget};

/// Runs the toolchain build for one fixed target.
///
/// A failed build is never retried here; the next file change triggers the
/// next attempt.
#[derive(Clone)]
pub struct Builder {
    toolchain: Arc<dyn Toolchain>,
    target: BuildTarget,
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Builder {
    pub fn new(toolchain: Arc<dyn Toolchain>, target: BuildTarget) -> Self {
        Self { toolchain, target }
    }

    /// Build once, propagating a `Build` error with the captured output.
    pub async fn build(&self) -> Result<BuildOutput> {
        let started = Instant::now();
        let output = self.toolchain.build(&self.target).await?;
        info!(
            build_target = %self.target.path().display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "successfully compiled"
        );
        if !output.output.trim().is_empty() {
            debug!(build_target = %self.target.path().display(), "build output:\n{}", output.output);
        }
        Ok(output)
    }

    /// Build once and log any failure instead of returning it.
    pub async fn build_and_report(&self) -> BuildStatus {
        match self.build().await {
            Ok(_) => BuildStatus::Succeeded,
            Err(err) => {
                error!(
                    build_target = %self.target.path().display(),
                    "error encountered while compiling:\n{err}"
                );
                BuildStatus::Failed
            }
        }
    }
}
