// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FreshError, Result};

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** validate. Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| FreshError::io(path, e))?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}

/// Build the effective configuration for a CLI invocation.
///
/// Starts from `--config` when given (defaults otherwise), then lets every
/// explicitly passed flag override the file value before validating.
pub fn resolve(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => RawConfigFile::default(),
    };

    if let Some(listen) = &args.listen {
        raw.serve.listen = listen.clone();
    }
    if let Some(dir) = &args.dir {
        raw.serve.dir = dir.clone();
    }
    if let Some(secs) = args.poll_timeout {
        raw.freshness.poll_timeout_secs = secs;
    }

    ConfigFile::try_from(raw)
}
