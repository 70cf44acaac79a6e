use std::path::{Path, PathBuf};

use crate::errors::{FreshError, Result};

/// Flags passed to the build tool when none are given on the command line.
pub const DEFAULT_BUILD_FLAGS: [&str; 2] = ["-o", "out.wasm"];

/// The entry package plus the flags it is built with.
///
/// Immutable once the engine has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    path: PathBuf,
    flags: Vec<String>,
}

impl BuildTarget {
    pub fn new(path: impl Into<PathBuf>, flags: Vec<String>) -> Self {
        Self {
            path: path.into(),
            flags,
        }
    }

    /// Resolve a possibly relative target against the current directory.
    pub fn resolve(path: impl AsRef<Path>, flags: Vec<String>) -> Result<Self> {
        let path = path.as_ref();
        let abs = std::path::absolute(path).map_err(|e| FreshError::io(path, e))?;
        Ok(Self::new(abs, flags))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Directory the build tool runs in: the target's parent, so a relative
    /// `-o out.wasm` lands next to the target rather than inside it.
    pub fn work_dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }
}

/// Whether the build behind a freshness signal succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Succeeded,
    Failed,
}
