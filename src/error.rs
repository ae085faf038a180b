use std::collections::BTreeMap;
use std::fmt;

/// Shown for transport failures where no response was obtained.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Shown when a request deadline elapsed.
pub const TIMEOUT_ERROR_MESSAGE: &str = "Request timed out. Please try again.";

/// Non-success response as seen by the client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpFailure {
    /// HTTP status code.
    pub status: u16,
    /// Backend-provided `message`, when the body carried one.
    pub message: Option<String>,
    /// Backend-provided field validation errors.
    pub errors: BTreeMap<String, Vec<String>>,
    /// Raw response body.
    pub body: String,
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self
            .message
            .as_deref()
            .filter(|message| !message.trim().is_empty());
        match message {
            Some(message) => write!(f, "{}: {message}", self.status),
            None => write!(f, "{}: {}", self.status, self.body),
        }
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum CoursewareError {
    /// No response was obtained (connect, DNS, TLS, reset).
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// The request deadline elapsed before a response arrived.
    #[error("request timed out: {0}")]
    Timeout(reqwest::Error),
    /// Transient server-side status that outlived every retry.
    #[error("server error {0}")]
    Server(HttpFailure),
    /// Any other non-success status.
    #[error("http error {0}")]
    Client(HttpFailure),
    /// 401 while a token was held. The token has been cleared.
    #[error("session expired ({0})")]
    SessionExpired(HttpFailure),
    /// The descriptor was rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// A success body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl CoursewareError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        self.http_failure().map(|failure| failure.status)
    }

    /// Response details for status-carrying failures.
    pub fn http_failure(&self) -> Option<&HttpFailure> {
        match self {
            Self::Server(failure) | Self::Client(failure) | Self::SessionExpired(failure) => {
                Some(failure)
            }
            _ => None,
        }
    }

    /// Human-readable description; see [`error_message`].
    pub fn user_message(&self) -> String {
        error_message(self)
    }
}

/// Maps any failure to a single string fit for display.
///
/// Preference order: backend `message`, network error text, timeout text,
/// then the raw error description.
pub fn error_message(err: &CoursewareError) -> String {
    if let Some(message) = err
        .http_failure()
        .and_then(|failure| failure.message.as_deref())
        .filter(|message| !message.trim().is_empty())
    {
        return message.to_owned();
    }

    match err {
        CoursewareError::Transport(_) => NETWORK_ERROR_MESSAGE.to_owned(),
        CoursewareError::Timeout(_) => TIMEOUT_ERROR_MESSAGE.to_owned(),
        other => other.to_string(),
    }
}
