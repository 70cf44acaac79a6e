// src/freshness/mod.rs

//! Freshness notification.
//!
//! - [`channel`] is the bounded hand-off between the watch loop (single
//!   producer) and HTTP handlers (many consumers).
//! - [`endpoint`] turns a poll outcome into the HTTP status/body pair the
//!   polling client expects.

pub mod channel;
pub mod endpoint;

pub use channel::{
    freshness_channel, FreshnessPublisher, FreshnessReceiver, FreshnessSignal, PollResult,
    DEFAULT_CAPACITY, DEFAULT_POLL_TIMEOUT,
};
pub use endpoint::{EndpointReply, FreshnessEndpoint, CLOSED_BODY, TIMEOUT_BODY};
