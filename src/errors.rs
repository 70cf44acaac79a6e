// src/errors.rs

//! Crate-wide error type.
//!
//! Startup errors (`Io`, `Discovery`, `Watcher` while registering paths)
//! abort the engine before it starts watching. `Build` and runtime
//! `Watcher` errors are logged and absorbed by the watch loop.
//! `InvariantViolation` always ends the loop.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreshError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dependency discovery failed: {0}")]
    Discovery(String),

    #[error("Build failed:\n{output}")]
    Build { output: String },

    #[error("File watcher error: {0}")]
    Watcher(String),

    #[error("Change event for untracked path {0:?}")]
    InvariantViolation(PathBuf),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FreshError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FreshError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors the watch loop must not absorb.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FreshError::Build { .. } | FreshError::Watcher(_))
    }
}

impl From<notify::Error> for FreshError {
    fn from(err: notify::Error) -> Self {
        FreshError::Watcher(err.to_string())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FreshError>;
