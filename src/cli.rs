// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::DEFAULT_BUILD_FLAGS;

/// Command-line arguments for `wasmfresh`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wasmfresh",
    version,
    about = "Rebuild a WASM target whenever its sources change and serve it with a reload signal.",
    long_about = None
)]
pub struct CliArgs {
    /// Package to build (directory or main file).
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Flags passed to the build tool before the target.
    ///
    /// Everything after TARGET is forwarded untouched (use `--` if a flag
    /// clashes with one of ours). Default: `-o out.wasm`.
    #[arg(
        value_name = "BUILD_FLAGS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        num_args = 0..
    )]
    pub build_flags: Vec<String>,

    /// Listen address (`HOST:PORT`, or `:PORT` for all interfaces).
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Directory to serve static files from.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Optional TOML config file; flags given here take precedence.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seconds a freshness poll waits before answering `timeout`.
    #[arg(long, value_name = "SECS")]
    pub poll_timeout: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WASMFRESH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Build flags as given, or the default output flags when none were.
    pub fn effective_build_flags(&self) -> Vec<String> {
        if self.build_flags.is_empty() {
            DEFAULT_BUILD_FLAGS.iter().map(|s| s.to_string()).collect()
        } else {
            self.build_flags.clone()
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
