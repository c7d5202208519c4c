//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned HTTP response for the programmable mock server.
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub extra_headers: Vec<(String, String)>,
}

impl MockResponse {
    /// JSON response with the given status.
    #[allow(dead_code)]
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: body.into(),
            extra_headers: Vec::new(),
        }
    }

    /// Non-JSON response, for content-type failure tests.
    #[allow(dead_code)]
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/html",
            body: body.into(),
            extra_headers: Vec::new(),
        }
    }

    #[allow(dead_code)]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.extra_headers.push((name.to_string(), value.to_string()));
        self
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a programmable mock HTTP server on an ephemeral port.
///
/// The closure runs once per request; it can sleep to simulate latency.
pub async fn start_programmable_server<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server addr");
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut buf = vec![0u8; 4096];
                        let mut read = 0;
                        while read < buf.len() {
                            match socket.read(&mut buf[read..]).await {
                                Ok(0) => break,
                                Ok(n) => {
                                    read += n;
                                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                }
                                Err(_) => return,
                            }
                        }

                        let response = f().await;
                        let mut head = format!(
                            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                            status_text(response.status),
                            response.content_type,
                            response.body.len()
                        );
                        for (name, value) in &response.extra_headers {
                            head.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        head.push_str("\r\n");

                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(response.body.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Minimal upstream feed body with one fully-populated object for `date`.
#[allow(dead_code)]
pub fn nasa_feed_body(date: &str) -> String {
    serde_json::json!({
        "near_earth_objects": {
            date: [{
                "id": "3542519",
                "name": "(2010 PK9)",
                "nasa_jpl_url": "https://ssd.jpl.nasa.gov/3542519",
                "is_potentially_hazardous_asteroid": true,
                "estimated_diameter": {
                    "feet": {
                        "estimated_diameter_min": 400.0,
                        "estimated_diameter_max": 800.0
                    }
                },
                "close_approach_data": [{
                    "close_approach_date": date,
                    "relative_velocity": { "miles_per_hour": "30000.5" },
                    "miss_distance": { "miles": "1000000.25" }
                }]
            }]
        }
    })
    .to_string()
}

/// A `FeedResult` body as the proxy would serve it, with a marker value
/// in `fetchedAt` so tests can tell responses apart.
#[allow(dead_code)]
pub fn feed_result_body(date: &str, marker: u32) -> String {
    serde_json::json!({
        "date": date,
        "items": [],
        "fetchedAt": format!("2024-06-01T00:00:00.{:03}Z", marker),
        "cache": "MISS"
    })
    .to_string()
}
