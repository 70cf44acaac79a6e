// src/config/model.rs

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::go::default_wasm_env;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [serve]
/// listen = "127.0.0.1:8080"
/// dir = "."
/// freshness_path = "/version"
///
/// [freshness]
/// poll_timeout_secs = 20
/// channel_capacity = 20
///
/// [toolchain]
/// program = "go"
/// env = { GOOS = "js", GOARCH = "wasm" }
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub serve: ServeSection,

    #[serde(default)]
    pub freshness: FreshnessSection,

    #[serde(default)]
    pub toolchain: ToolchainSection,
}

/// Validated configuration.
///
/// Constructed via `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub serve: ServeSection,
    pub freshness: FreshnessSection,
    pub toolchain: ToolchainSection,
    listen_addr: SocketAddr,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile, listen_addr: SocketAddr) -> Self {
        Self {
            serve: raw.serve,
            freshness: raw.freshness,
            toolchain: raw.toolchain,
            listen_addr,
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.freshness.poll_timeout_secs)
    }
}

/// `[serve]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeSection {
    /// Listen address. A bare `:8080` means every interface.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Directory static files are served from.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// URL path of the long-poll freshness endpoint.
    #[serde(default = "default_freshness_path")]
    pub freshness_path: String,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_freshness_path() -> String {
    "/version".to_string()
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            dir: default_dir(),
            freshness_path: default_freshness_path(),
        }
    }
}

/// `[freshness]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FreshnessSection {
    /// How long a poll waits before answering `timeout`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Signals buffered for pollers before the oldest is dropped.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_poll_timeout_secs() -> u64 {
    crate::freshness::DEFAULT_POLL_TIMEOUT.as_secs()
}

fn default_channel_capacity() -> usize {
    crate::freshness::DEFAULT_CAPACITY
}

impl Default for FreshnessSection {
    fn default() -> Self {
        Self {
            poll_timeout_secs: default_poll_timeout_secs(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// `[toolchain]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainSection {
    /// Build tool executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Environment overrides for every toolchain invocation.
    ///
    /// Replaces the default `GOOS=js GOARCH=wasm` pair entirely when set.
    #[serde(default = "default_wasm_env")]
    pub env: BTreeMap<String, String>,
}

fn default_program() -> String {
    "go".to_string()
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            env: default_wasm_env(),
        }
    }
}
