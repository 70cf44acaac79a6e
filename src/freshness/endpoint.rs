// src/freshness/endpoint.rs

use tokio::runtime::Handle;
use tracing::debug;

use crate::freshness::channel::{FreshnessReceiver, PollResult};

/// Body sent when no signal arrived within the poll window.
pub const TIMEOUT_BODY: &str = "timeout";

/// Body sent once the watch loop has stopped.
pub const CLOSED_BODY: &str = "ERROR, freshness engine stopped";

/// Status code and body for one freshness request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReply {
    pub status: u16,
    pub body: String,
}

impl From<PollResult> for EndpointReply {
    fn from(result: PollResult) -> Self {
        match result {
            PollResult::Fresh(signal) => EndpointReply {
                status: 200,
                body: signal.digest.to_hex(),
            },
            PollResult::Timeout => EndpointReply {
                status: 200,
                body: TIMEOUT_BODY.to_string(),
            },
            PollResult::Closed => EndpointReply {
                status: 500,
                body: CLOSED_BODY.to_string(),
            },
        }
    }
}

/// Long-poll endpoint wrapping a [`FreshnessReceiver`].
///
/// Every request waits independently; no shared work is cancelled when a
/// request times out.
#[derive(Debug, Clone)]
pub struct FreshnessEndpoint {
    receiver: FreshnessReceiver,
}

impl FreshnessEndpoint {
    pub fn new(receiver: FreshnessReceiver) -> Self {
        Self { receiver }
    }

    pub async fn respond(&self) -> EndpointReply {
        let result = self.receiver.poll().await;
        debug!(?result, "freshness poll finished");
        EndpointReply::from(result)
    }

    /// Synchronous wrapper for HTTP worker threads.
    ///
    /// Must not be called from inside the runtime's own worker threads.
    pub fn respond_blocking(&self, handle: &Handle) -> EndpointReply {
        handle.block_on(self.respond())
    }
}
