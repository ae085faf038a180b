use std::time::Duration;

use reqwest::Method;
use serde::Serialize;

use crate::{CoursewareError, Result};

/// Immutable description of one outbound call.
///
/// The same descriptor is resubmitted unchanged on every retry.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Backend-relative route, e.g. `/courses`.
    pub path: String,
    /// Query parameters in send order.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<serde_json::Value>,
    /// Overrides [`ClientOptions::timeout_ms`](crate::ClientOptions::timeout_ms).
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets an already-built JSON body.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `payload` as the JSON body.
    pub fn with_json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self> {
        let body = serde_json::to_value(payload).map_err(|err| {
            CoursewareError::InvalidRequest(format!("body is not serializable: {err}"))
        })?;
        Ok(self.with_body(body))
    }

    /// Sets a per-call deadline. Elapsing it is terminal, not retried.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks that the path is a backend-relative route.
    ///
    /// A leading `/` already rules out a scheme; only `//` (a network-path
    /// reference) and dot segments, which URL normalization would resolve
    /// to another route, are rejected beyond that.
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(CoursewareError::InvalidRequest(format!(
                "path must start with '/': {}",
                self.path
            )));
        }
        if self.path.starts_with("//") {
            return Err(CoursewareError::InvalidRequest(format!(
                "path must be backend-relative: {}",
                self.path
            )));
        }
        let route = self.path.split(['?', '#']).next().unwrap_or_default();
        if route.split('/').any(is_dot_segment) {
            return Err(CoursewareError::InvalidRequest(format!(
                "path must not contain '.' or '..' segments: {}",
                self.path
            )));
        }
        Ok(())
    }
}

/// `.` or `..`, including their percent-encoded spellings.
pub(crate) fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().replace("%2e", ".").as_str(),
        "." | ".."
    )
}
