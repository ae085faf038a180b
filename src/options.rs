use crate::retry::{BASE_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRIES};

/// Configures timeout, retry and session-expiry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Default per-request timeout in milliseconds.
    ///
    /// A descriptor may override it with
    /// [`RequestDescriptor::with_timeout`](crate::RequestDescriptor::with_timeout).
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base retry backoff in milliseconds (doubled on every retry).
    pub retry_backoff_ms: u64,
    /// Upper bound for a single backoff wait in milliseconds.
    pub max_backoff_ms: u64,
    /// Destination handed to the session-expiry handler.
    pub login_path: String,
    /// Emits request diagnostics when the `tracing` feature is enabled.
    ///
    /// Defaults to on for debug builds and off for release builds.
    pub diagnostics: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: MAX_RETRIES,
            retry_backoff_ms: BASE_BACKOFF_MS,
            max_backoff_ms: MAX_BACKOFF_MS,
            login_path: "/login".to_owned(),
            diagnostics: cfg!(debug_assertions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClientOptions;

    #[test]
    fn defaults_match_retry_policy() {
        let opts = ClientOptions::default();
        assert_eq!(opts.timeout_ms, 10_000);
        assert_eq!(opts.max_retries, 3);
        assert_eq!(opts.retry_backoff_ms, 1_000);
        assert_eq!(opts.max_backoff_ms, 10_000);
        assert_eq!(opts.login_path, "/login");
    }
}
