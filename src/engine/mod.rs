// src/engine/mod.rs

//! Freshness engine.
//!
//! This module ties together:
//! - the startup phase (initial build, dependency discovery, file map,
//!   watcher registration) in [`startup`]
//! - the pure decision core in [`core`]
//! - the async watch loop in [`runtime`], which reacts to:
//!   - file change events
//!   - watcher errors
//!   - stop requests

/// Lifecycle states of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Resolving the target.
    Starting,
    /// Running the initial build.
    Building,
    /// Waiting for change events.
    Watching,
    /// A tracked file changed; a build is in progress.
    Rebuilding,
    /// The loop has exited and released the watcher.
    Stopped,
}

pub mod core;
pub mod runtime;
pub mod startup;

pub use core::{ChangeOutcome, CoreCommand, CoreStep, WatchCore};
pub use runtime::WatchLoop;
pub use startup::{Engine, RunningEngine};
