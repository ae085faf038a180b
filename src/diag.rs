//! Request diagnostics.
//!
//! Events are compiled in only with the `tracing` feature and emitted only
//! when [`ClientOptions::diagnostics`](crate::ClientOptions::diagnostics) is
//! set. Callers must never pass the token as a field.

macro_rules! diag {
    ($enabled:expr, $level:ident, $($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        {
            if $enabled {
                tracing::$level!($($arg)+);
            }
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = $enabled;
        }
    }};
}
