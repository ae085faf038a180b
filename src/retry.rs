//! Retry policy: which failures are resubmitted and how long to wait.

use std::time::Duration;

use reqwest::StatusCode;

/// Maximum number of retries after the initial attempt.
pub const MAX_RETRIES: u32 = 3;

/// Wait before the first retry, in milliseconds.
pub const BASE_BACKOFF_MS: u64 = 1_000;

/// Upper bound for a single backoff wait, in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 10_000;

/// How a transport-level failure (no response) should be treated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TransportClass {
    /// Connection, DNS, TLS or body read failure.
    Retryable,
    /// Deadline elapsed. Never retried.
    Timeout,
    /// The request could not be built at all.
    Invalid,
}

/// Returns `true` for statuses worth resubmitting: 408, 429, 500, 502, 503, 504.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

pub(crate) fn classify_transport(err: &reqwest::Error) -> TransportClass {
    if err.is_timeout() {
        TransportClass::Timeout
    } else if err.is_builder() {
        TransportClass::Invalid
    } else {
        TransportClass::Retryable
    }
}

/// Backoff before retry number `retries_done + 1`.
///
/// `base * 2^retries_done`, capped at `cap`: with the defaults this yields
/// 1000, 2000, 4000, 8000, 10000, 10000, ... milliseconds.
pub fn backoff_delay(retries_done: u32, base_ms: u64, cap_ms: u64) -> Duration {
    let exp = retries_done.min(16);
    let multiplier = 1u64 << exp;
    Duration::from_millis(base_ms.saturating_mul(multiplier).min(cap_ms))
}

/// Suspends the current task for `delay` without blocking the thread.
///
/// Returns whether the wait actually happened.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn sleep(delay: Duration) -> bool {
    tokio::time::sleep(delay).await;
    true
}

/// Suspends the current task for `delay` on a JS timer.
///
/// Returns `false` without waiting when no timer could be scheduled: the
/// host exposes no `setTimeout` (some edge runtimes) or the call threw.
/// The promise is resolved either way so the call never hangs.
#[cfg(target_arch = "wasm32")]
pub(crate) async fn sleep(delay: Duration) -> bool {
    use wasm_bindgen::{JsCast, JsValue};

    let millis = delay.as_millis().min(i32::MAX as u128) as i32;
    let mut scheduled = false;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let global = js_sys::global();
        scheduled = js_sys::Reflect::get(&global, &JsValue::from_str("setTimeout"))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok())
            .is_some_and(|set_timeout| {
                set_timeout
                    .call2(&global, &resolve, &JsValue::from(millis))
                    .is_ok()
            });
        if !scheduled {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    scheduled
}
