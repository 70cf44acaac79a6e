// tests/freshness_polling.rs

use std::time::{Duration, Instant};

use wasmfresh::freshness::{
    freshness_channel, FreshnessEndpoint, FreshnessSignal, CLOSED_BODY, TIMEOUT_BODY,
};
use wasmfresh::types::BuildStatus;
use wasmfresh::watch::Digest;

fn signal(tag: &[u8]) -> FreshnessSignal {
    FreshnessSignal {
        digest: Digest::of(tag),
        build: BuildStatus::Succeeded,
    }
}

#[tokio::test]
async fn quiet_engine_answers_timeout_after_the_poll_window() {
    let (_publisher, receiver) = freshness_channel(20, Duration::from_millis(100));
    let endpoint = FreshnessEndpoint::new(receiver);

    let started = Instant::now();
    let reply = endpoint.respond().await;

    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, TIMEOUT_BODY);
}

#[tokio::test]
async fn signal_published_during_a_poll_is_delivered_to_it() {
    let (publisher, receiver) = freshness_channel(20, Duration::from_secs(5));
    let endpoint = FreshnessEndpoint::new(receiver);

    let waiting = tokio::spawn(async move { endpoint.respond().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    publisher.publish(signal(b"rebuilt")).await;

    let reply = waiting.await.unwrap();
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, Digest::of(b"rebuilt").to_hex());
    assert_eq!(reply.body.len(), 64);
}

#[tokio::test]
async fn failed_build_still_reports_the_new_digest() {
    let (publisher, receiver) = freshness_channel(20, Duration::from_secs(5));
    publisher
        .publish(FreshnessSignal {
            digest: Digest::of(b"broken"),
            build: BuildStatus::Failed,
        })
        .await;

    let reply = FreshnessEndpoint::new(receiver).respond().await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, Digest::of(b"broken").to_hex());
}

#[tokio::test]
async fn stopped_engine_answers_500() {
    let (publisher, receiver) = freshness_channel(20, Duration::from_secs(5));
    drop(publisher);

    let reply = FreshnessEndpoint::new(receiver).respond().await;
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, CLOSED_BODY);
}

#[tokio::test]
async fn concurrent_polls_each_take_at_most_one_signal() {
    let (publisher, receiver) = freshness_channel(20, Duration::from_millis(300));
    let first = FreshnessEndpoint::new(receiver.clone());
    let second = FreshnessEndpoint::new(receiver);

    publisher.publish(signal(b"only")).await;
    let (a, b) = tokio::join!(first.respond(), second.respond());

    let bodies = [a.body, b.body];
    let fresh = bodies.iter().filter(|b| b.as_str() != TIMEOUT_BODY).count();
    assert_eq!(fresh, 1, "{bodies:?}");
}
