#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use courseware_http::{SessionExpiryHandler, TokenStore};
use serde_json::{json, Value as JsonValue};

#[derive(Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: JsonValue,
    pub delay: Duration,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: JsonValue) -> Self {
        Self {
            status,
            body,
            delay: Duration::from_millis(0),
        }
    }

    pub fn ok(data: JsonValue) -> Self {
        Self::json(StatusCode::OK, json!({ "success": true, "data": data }))
    }

    pub fn status(status: StatusCode) -> Self {
        Self::json(
            status,
            json!({ "success": false, "message": status.canonical_reason() }),
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// One request as received by the mock backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

async fn handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let path = uri.path().to_owned();
    state
        .requests
        .lock()
        .expect("request log mutex must not be poisoned")
        .push(Recorded {
            method,
            path: path.clone(),
            query: uri.query().map(str::to_owned),
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned),
            body,
        });

    let response = {
        let mut routes = state
            .responses
            .lock()
            .expect("response queue mutex must not be poisoned");
        routes
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                MockResponse::json(
                    StatusCode::NOT_FOUND,
                    json!({"success": false, "message": "no mock response available"}),
                )
            })
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    (response.status, Json(response.body))
}

pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TestServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests
            .lock()
            .expect("request log mutex must not be poisoned")
            .clone()
    }

    pub fn hits(&self) -> usize {
        self.requests().len()
    }
}

/// Serves queued responses per path. Unknown or drained paths answer 404.
pub async fn spawn_server(routes: Vec<(&str, Vec<MockResponse>)>) -> TestServer {
    let responses = routes
        .into_iter()
        .map(|(path, queue)| (path.to_owned(), VecDeque::from(queue)))
        .collect();
    let state = MockState {
        responses: Arc::new(Mutex::new(responses)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new().fallback(handler).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        base_url: format!("http://{address}/api"),
        requests: state.requests,
        task,
    }
}

/// Token store that counts reads and can rotate through tokens.
#[derive(Default)]
pub struct ScriptedTokenStore {
    tokens: Mutex<VecDeque<String>>,
    current: Mutex<Option<String>>,
    reads: AtomicUsize,
    clears: AtomicUsize,
}

impl ScriptedTokenStore {
    /// Each read returns the next token; the last one sticks.
    pub fn rotating(tokens: &[&str]) -> Self {
        Self {
            tokens: Mutex::new(tokens.iter().map(|t| (*t).to_owned()).collect()),
            ..Self::default()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl TokenStore for ScriptedTokenStore {
    fn get(&self) -> Option<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let next = self.tokens.lock().expect("lock").pop_front();
        let mut current = self.current.lock().expect("lock");
        if next.is_some() {
            *current = next;
        }
        current.clone()
    }

    fn set(&self, token: String) {
        self.tokens.lock().expect("lock").clear();
        *self.current.lock().expect("lock") = Some(token);
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().expect("lock").clear();
        *self.current.lock().expect("lock") = None;
    }
}

/// Records every redirect the client requests.
#[derive(Clone, Default)]
pub struct RedirectLog(pub Arc<Mutex<Vec<String>>>);

impl RedirectLog {
    pub fn destinations(&self) -> Vec<String> {
        self.0.lock().expect("lock").clone()
    }
}

impl SessionExpiryHandler for RedirectLog {
    fn session_expired(&self, login_path: &str) {
        self.0.lock().expect("lock").push(login_path.to_owned());
    }
}
