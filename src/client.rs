use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, StatusCode};

use crate::{
    response::FailureBody,
    retry::{self, TransportClass},
    ApiResponse, ClientOptions, CoursewareError, HttpFailure, MemoryTokenStore, RequestDescriptor,
    Result, SessionExpiryHandler, TokenStore,
};

/// HTTP client for the Courseware REST API.
///
/// Every call reads the bearer token fresh from the [`TokenStore`], retries
/// transient failures with exponential backoff and classifies the final
/// failure into a [`CoursewareError`]. Clones share the connection pool and
/// the injected capabilities.
#[derive(Clone)]
pub struct CoursewareClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    on_session_expired: Option<Arc<dyn SessionExpiryHandler>>,
    options: ClientOptions,
}

impl fmt::Debug for CoursewareClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.tokens.get().is_some() {
            "<redacted>"
        } else {
            "<none>"
        };
        f.debug_struct("CoursewareClient")
            .field("base_url", &self.base_url)
            .field("token", &token)
            .field("session_expiry_handler", &self.on_session_expired.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl CoursewareClient {
    /// Creates a client for `base_url` with an empty in-memory token store
    /// and no session-expiry handler.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            tokens: Arc::new(MemoryTokenStore::new()),
            on_session_expired: None,
            options: ClientOptions::default(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `COURSEWARE_API_URL` — backend base URL (e.g. `https://api.example.com/api`)
    /// - `COURSEWARE_TOKEN` — optional access token seeding the in-memory store
    ///
    /// **Not available on `wasm32` targets.**
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> std::result::Result<Self, String> {
        let url = std::env::var("COURSEWARE_API_URL")
            .map_err(|_| "missing COURSEWARE_API_URL environment variable".to_owned())?;
        if url.trim().is_empty() {
            return Err("COURSEWARE_API_URL is set but empty".to_owned());
        }

        let client = Self::new(url.trim());
        match std::env::var("COURSEWARE_TOKEN") {
            Ok(token) if !token.trim().is_empty() => {
                Ok(client.with_token_store(Arc::new(MemoryTokenStore::with_token(token.trim()))))
            }
            _ => Ok(client),
        }
    }

    /// Replaces the underlying `reqwest` client (proxies, custom TLS, ...).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Injects the persisted token storage.
    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Registers the callback invoked once per session expiry.
    pub fn with_session_expiry_handler(
        mut self,
        handler: impl SessionExpiryHandler + 'static,
    ) -> Self {
        self.on_session_expired = Some(Arc::new(handler));
        self
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Executes `request`, retrying transient failures.
    ///
    /// Returns the first 2xx response unchanged. A 401 received while a
    /// token is held clears the token, notifies the session-expiry handler
    /// and fails with [`CoursewareError::SessionExpired`].
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<ApiResponse> {
        request.validate()?;
        let url = self.url_for(&request.path);
        let mut retries = 0u32;

        loop {
            diag!(
                self.options.diagnostics,
                debug,
                method = %request.method,
                path = %request.path,
                attempt = retries + 1,
                "request start"
            );

            let err = match self.send_once(request, &url).await {
                Ok((status, body)) if status.is_success() => {
                    diag!(
                        self.options.diagnostics,
                        debug,
                        method = %request.method,
                        path = %request.path,
                        status = status.as_u16(),
                        retries,
                        "response"
                    );
                    return Ok(ApiResponse {
                        status: status.as_u16(),
                        body,
                        retries,
                    });
                }
                Ok((status, body)) => {
                    if retry::is_retryable_status(status) && retries < self.options.max_retries {
                        diag!(
                            self.options.diagnostics,
                            warn,
                            method = %request.method,
                            path = %request.path,
                            status = status.as_u16(),
                            "retryable status"
                        );
                        self.wait_before_retry(retries).await;
                        retries += 1;
                        continue;
                    }
                    self.http_failure(status, body)
                }
                Err(err) => match retry::classify_transport(&err) {
                    TransportClass::Retryable if retries < self.options.max_retries => {
                        diag!(
                            self.options.diagnostics,
                            warn,
                            method = %request.method,
                            path = %request.path,
                            error = %err,
                            "transport failure"
                        );
                        self.wait_before_retry(retries).await;
                        retries += 1;
                        continue;
                    }
                    TransportClass::Retryable => CoursewareError::Transport(err),
                    TransportClass::Timeout => CoursewareError::Timeout(err),
                    TransportClass::Invalid => CoursewareError::InvalidRequest(err.to_string()),
                },
            };

            diag!(
                self.options.diagnostics,
                warn,
                method = %request.method,
                path = %request.path,
                retries,
                error = %err,
                "request failed"
            );
            return Err(err);
        }
    }

    /// One transmission of `request`. The token is read here, per attempt.
    async fn send_once(
        &self,
        request: &RequestDescriptor,
        url: &str,
    ) -> std::result::Result<(StatusCode, String), reqwest::Error> {
        let timeout = request
            .timeout
            .unwrap_or(Duration::from_millis(self.options.timeout_ms));

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.tokens.get() {
            builder = builder.header(header::AUTHORIZATION, bearer_authorization(&token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    fn http_failure(&self, status: StatusCode, body: String) -> CoursewareError {
        let parsed = FailureBody::parse(&body);
        let failure = HttpFailure {
            status: status.as_u16(),
            message: parsed.message,
            errors: parsed.errors.unwrap_or_default(),
            body,
        };

        if status == StatusCode::UNAUTHORIZED {
            return self.expire_session(failure);
        }
        if retry::is_retryable_status(status) {
            CoursewareError::Server(failure)
        } else {
            CoursewareError::Client(failure)
        }
    }

    /// A 401 only expires a session that exists: without a stored token it
    /// is an ordinary client failure.
    fn expire_session(&self, failure: HttpFailure) -> CoursewareError {
        if self.tokens.get().is_none() {
            return CoursewareError::Client(failure);
        }

        self.tokens.clear();
        diag!(
            self.options.diagnostics,
            info,
            login_path = %self.options.login_path,
            "session expired, token cleared"
        );
        if let Some(handler) = &self.on_session_expired {
            handler.session_expired(&self.options.login_path);
        }
        CoursewareError::SessionExpired(failure)
    }

    async fn wait_before_retry(&self, retries_done: u32) {
        let delay = retry::backoff_delay(
            retries_done,
            self.options.retry_backoff_ms,
            self.options.max_backoff_ms,
        );
        diag!(
            self.options.diagnostics,
            warn,
            retry = retries_done + 1,
            delay_ms = delay.as_millis() as u64,
            "retrying request"
        );
        if !retry::sleep(delay).await {
            diag!(
                self.options.diagnostics,
                warn,
                delay_ms = delay.as_millis() as u64,
                "no timer available, retrying without backoff"
            );
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

/// Stored tokens may or may not carry the scheme already.
fn bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
