#![cfg(feature = "tracing")]

mod common;

use std::{
    io,
    sync::{Arc, Mutex},
};

use axum::http::StatusCode;
use common::{spawn_server, MockResponse};
use courseware_http::{
    ClientOptions, CoursewareClient, CoursewareError, MemoryTokenStore, RequestDescriptor,
};
use serde_json::json;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

const SECRET: &str = "secret-token-xyz";

/// In-memory sink for formatted events.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        let bytes = self.0.lock().expect("log buffer mutex must not be poisoned");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer mutex must not be poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Installs a thread-local subscriber that records this crate's events.
fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
    let captured = Captured::default();
    let writer = captured.clone();
    let guard = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("courseware_http=debug"))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish()
        .set_default();
    (captured, guard)
}

fn options(diagnostics: bool) -> ClientOptions {
    ClientOptions {
        timeout_ms: 2_000,
        retry_backoff_ms: 1,
        diagnostics,
        ..ClientOptions::default()
    }
}

async fn retried_then_expired(diagnostics: bool) -> CoursewareError {
    let server = spawn_server(vec![(
        "/api/courses",
        vec![
            MockResponse::status(StatusCode::SERVICE_UNAVAILABLE),
            MockResponse::json(
                StatusCode::UNAUTHORIZED,
                json!({"success": false, "message": "Token expired"}),
            ),
        ],
    )])
    .await;
    let client = CoursewareClient::new(&server.base_url)
        .with_token_store(Arc::new(MemoryTokenStore::with_token(SECRET)))
        .with_options(options(diagnostics));

    let err = client
        .execute(&RequestDescriptor::get("/courses"))
        .await
        .expect_err("401 must fail the call");
    assert_eq!(server.hits(), 2);
    err
}

#[tokio::test]
async fn lifecycle_events_are_emitted_without_the_token() {
    let (captured, _guard) = capture();

    let err = retried_then_expired(true).await;
    assert!(matches!(err, CoursewareError::SessionExpired(_)));

    let logs = captured.text();
    for event in [
        "request start",
        "retryable status",
        "retrying request",
        "session expired, token cleared",
        "request failed",
    ] {
        assert!(logs.contains(event), "missing {event:?} in:\n{logs}");
    }
    assert_eq!(logs.matches("request start").count(), 2, "{logs}");
    assert!(logs.contains("delay_ms=1"), "{logs}");
    assert!(!logs.contains(SECRET), "token leaked into diagnostics:\n{logs}");
}

#[tokio::test]
async fn disabled_diagnostics_emit_nothing() {
    let (captured, _guard) = capture();

    let err = retried_then_expired(false).await;
    assert!(matches!(err, CoursewareError::SessionExpired(_)));

    assert_eq!(captured.text(), "");
}
