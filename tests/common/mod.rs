#![allow(dead_code)]

use std::time::Duration;

use wasmfresh::freshness::{FreshnessReceiver, PollResult};

pub use wasmfresh_test_utils::{init_tracing, with_timeout, with_timeout_secs};

/// Poll until a fresh signal arrives or `attempts` polls have timed out.
pub async fn next_fresh(receiver: &FreshnessReceiver, attempts: usize) -> Option<PollResult> {
    for _ in 0..attempts {
        match receiver.poll().await {
            PollResult::Timeout => continue,
            other => return Some(other),
        }
    }
    None
}

/// Give the OS watcher a moment to settle before touching files.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}
