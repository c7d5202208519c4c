//! Failure-classification and retry tests for the upstream fetcher.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use neo_proxy::config::UpstreamConfig;
use neo_proxy::upstream::{FeedClient, UpstreamError};

mod common;
use common::{nasa_feed_body, start_programmable_server, MockResponse};

fn upstream_config(addr: std::net::SocketAddr, timeout_ms: u64, max_retries: u32) -> UpstreamConfig {
    UpstreamConfig {
        api_key: "TEST_KEY".into(),
        base_url: format!("http://{}", addr),
        timeout_ms,
        max_retries,
    }
}

#[tokio::test]
async fn rate_limited_surfaces_immediately_without_retry() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = start_programmable_server(move || {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            MockResponse::json(429, r#"{"error":"over quota"}"#).with_header("retry-after", "30")
        }
    })
    .await;

    let client = FeedClient::from_config(&upstream_config(addr, 2000, 2)).unwrap();
    let err = client.fetch_feed("2024-06-01").await.unwrap_err();

    match err {
        UpstreamError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 30),
        other => panic!("expected RateLimited, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1, "429 must not retry");
}

#[tokio::test]
async fn missing_retry_after_defaults_to_sixty() {
    let addr = start_programmable_server(|| async {
        MockResponse::json(429, r#"{"error":"over quota"}"#)
    })
    .await;

    let client = FeedClient::from_config(&upstream_config(addr, 2000, 2)).unwrap();
    match client.fetch_feed("2024-06-01").await.unwrap_err() {
        UpstreamError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 60),
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn server_errors_retry_with_backoff_then_succeed() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = start_programmable_server(move || {
        let c = c.clone();
        async move {
            let count = c.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                MockResponse::json(500, r#"{"error":"flaky"}"#)
            } else {
                MockResponse::json(200, nasa_feed_body("2024-06-01"))
            }
        }
    })
    .await;

    let client = FeedClient::from_config(&upstream_config(addr, 2000, 2)).unwrap();
    let started = Instant::now();
    let data = client.fetch_feed("2024-06-01").await.expect("should succeed on third attempt");
    let elapsed = started.elapsed();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(data.items.len(), 1);
    // Two backoffs with floors of 300ms and 600ms (jitter lower bound 1x).
    assert!(
        elapsed >= Duration::from_millis(900),
        "elapsed {:?} below backoff floor",
        elapsed
    );
}

#[tokio::test]
async fn client_errors_never_retry() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = start_programmable_server(move || {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            MockResponse::json(404, r#"{"error":"no such endpoint"}"#)
        }
    })
    .await;

    let client = FeedClient::from_config(&upstream_config(addr, 2000, 2)).unwrap();
    match client.fetch_feed("2024-06-01").await.unwrap_err() {
        UpstreamError::BadRequest { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("no such endpoint"));
        }
        other => panic!("expected BadRequest, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn timeouts_exhaust_retries_and_surface_as_timeout() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = start_programmable_server(move || {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(500)).await;
            MockResponse::json(200, "{}")
        }
    })
    .await;

    let client = FeedClient::from_config(&upstream_config(addr, 100, 1)).unwrap();
    match client.fetch_feed("2024-06-01").await.unwrap_err() {
        UpstreamError::Timeout => {}
        other => panic!("expected Timeout, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2, "one retry after the first timeout");
}

#[tokio::test]
async fn normalizes_and_scores_feed_objects() {
    let addr = start_programmable_server(|| async {
        MockResponse::json(200, nasa_feed_body("2024-06-01"))
    })
    .await;

    let client = FeedClient::from_config(&upstream_config(addr, 2000, 0)).unwrap();
    let data = client.fetch_feed("2024-06-01").await.unwrap();

    assert_eq!(data.date, "2024-06-01");
    let record = &data.items[0];
    assert_eq!(record.id, "3542519");
    assert_eq!(record.diameter_ft, Some(600.0));
    assert_eq!(record.speed_mph, Some(30000.5));
    assert_eq!(record.distance_miles, Some(1_000_000.25));
    assert!(record.hazardous);
    assert!(record.risk_score > 0 && record.risk_score <= 100);
}
