use crate::common;
use crate::common::RecordingThrottleObserver;
use exactonline_rs::ExactClient;
use httpmock::Method::GET;
use httpmock::MockServer;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Mock a GET on `path` answering with the given minutely headers, and issue
/// one call against it so the client's snapshot picks them up.
async fn seed_minutely(server: &MockServer, client: &ExactClient, remaining: i64, reset: i64) {
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/seed");
        then.status(200)
            .header("X-RateLimit-Minutely-Limit", "60")
            .header("X-RateLimit-Minutely-Remaining", remaining.to_string())
            .header("X-RateLimit-Minutely-Reset", reset.to_string())
            .body("{}");
    });
    let endpoint = format!("{}seed", client.base_url());
    client.get(&endpoint, None).await.unwrap();
}

#[tokio::test]
async fn the_snapshot_is_updated_on_success() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/seed");
        then.status(200)
            .header("X-RateLimit-Limit", "5000")
            .header("X-RateLimit-Remaining", "4999")
            .header("X-RateLimit-Reset", "1700000000000")
            .header("X-RateLimit-Minutely-Limit", "60")
            .header("X-RateLimit-Minutely-Remaining", "59")
            .header("X-RateLimit-Minutely-Reset", "1700000060000")
            .body("{}");
    });

    let client = common::client(&server);
    let endpoint = format!("{}seed", client.base_url());
    client.get(&endpoint, None).await.unwrap();

    let limits = client.rate_limits().await;
    assert_eq!(limits.daily.limit, Some(5000));
    assert_eq!(limits.daily.remaining, Some(4999));
    assert_eq!(limits.daily.reset, Some(1_700_000_000_000));
    assert_eq!(limits.minutely.limit, Some(60));
    assert_eq!(limits.minutely.remaining, Some(59));
    assert_eq!(limits.minutely.reset, Some(1_700_000_060_000));
}

#[tokio::test]
async fn the_snapshot_is_updated_on_failure_too() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/seed");
        then.status(500)
            .header("X-RateLimit-Remaining", "4998")
            .header("X-RateLimit-Minutely-Remaining", "58")
            .body("");
    });

    let client = common::client(&server);
    let endpoint = format!("{}seed", client.base_url());
    client.get(&endpoint, None).await.unwrap_err();

    let limits = client.rate_limits().await;
    assert_eq!(limits.daily.remaining, Some(4998));
    assert_eq!(limits.minutely.remaining, Some(58));
    // Headers that were absent stay unset.
    assert_eq!(limits.daily.limit, None);
    assert_eq!(limits.minutely.reset, None);
}

#[tokio::test]
async fn absent_headers_leave_the_snapshot_empty() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/seed");
        then.status(200).body("{}");
    });

    let client = common::client(&server);
    let endpoint = format!("{}seed", client.base_url());
    client.get(&endpoint, None).await.unwrap();

    assert_eq!(client.rate_limits().await, Default::default());
}

#[tokio::test]
async fn an_exhausted_minutely_window_delays_the_next_call() {
    let server = common::setup_server();
    let (observer, delays) = RecordingThrottleObserver::new();
    let client = common::client_builder(&server)
        .throttle_observer(observer)
        .build()
        .unwrap();

    seed_minutely(&server, &client, 0, now_ms() + 800).await;

    let next = server.mock(|when, then| {
        when.method(GET).path("/api/v1/next");
        then.status(200).body("{}");
    });

    let started = Instant::now();
    let endpoint = format!("{}next", client.base_url());
    client.get(&endpoint, None).await.unwrap();

    next.assert();
    assert!(
        started.elapsed() >= Duration::from_millis(400),
        "expected the call to wait out the window, took {:?}",
        started.elapsed()
    );
    let delays = delays.lock().unwrap();
    assert_eq!(delays.len(), 1);
    assert!(delays[0] > Duration::ZERO && delays[0] <= Duration::from_millis(800));
}

#[tokio::test]
async fn throttling_is_skipped_while_calls_remain() {
    let server = common::setup_server();
    let (observer, delays) = RecordingThrottleObserver::new();
    let client = common::client_builder(&server)
        .throttle_observer(observer)
        .build()
        .unwrap();

    seed_minutely(&server, &client, 5, now_ms() + 60_000).await;

    let next = server.mock(|when, then| {
        when.method(GET).path("/api/v1/next");
        then.status(200).body("{}");
    });

    let endpoint = format!("{}next", client.base_url());
    client.get(&endpoint, None).await.unwrap();

    next.assert();
    // The observer fires before any throttle sleep, so an untouched recorder
    // means no wait happened.
    assert!(delays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn throttling_is_skipped_when_the_reset_lies_in_the_past() {
    let server = common::setup_server();
    let (observer, delays) = RecordingThrottleObserver::new();
    let client = common::client_builder(&server)
        .throttle_observer(observer)
        .build()
        .unwrap();

    seed_minutely(&server, &client, 0, now_ms() - 1_000).await;

    let next = server.mock(|when, then| {
        when.method(GET).path("/api/v1/next");
        then.status(200).body("{}");
    });

    let endpoint = format!("{}next", client.base_url());
    client.get(&endpoint, None).await.unwrap();

    next.assert();
    assert!(delays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn throttling_is_skipped_when_the_window_is_unknown() {
    let server = common::setup_server();
    let (observer, delays) = RecordingThrottleObserver::new();
    let client = common::client_builder(&server)
        .throttle_observer(observer)
        .build()
        .unwrap();

    // First call: nothing is known yet, so no wait can happen.
    let first = server.mock(|when, then| {
        when.method(GET).path("/api/v1/seed");
        then.status(200).body("{}");
    });
    let endpoint = format!("{}seed", client.base_url());
    client.get(&endpoint, None).await.unwrap();
    client.get(&endpoint, None).await.unwrap();

    first.assert_hits(2);
    assert!(delays.lock().unwrap().is_empty());
}
