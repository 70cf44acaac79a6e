// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Hashing file contents ([`hash`]).
//! - Keeping the path → digest snapshot and its aggregate digest
//!   ([`file_map`]).
//! - Wiring up a cross-platform filesystem watcher (`notify`) over every
//!   tracked file ([`watcher`]).
//!
//! It does **not** decide when to rebuild; that is the engine's job.

pub mod file_map;
pub mod hash;
pub mod watcher;

pub use file_map::FileMap;
pub use hash::{digest_file, Digest, EMPTY_DIGEST_HEX};
pub use watcher::{spawn_file_watcher, WatchEvent, WatcherHandle};
