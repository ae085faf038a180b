//! Session capabilities injected into the client.

use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Persisted bearer-token storage.
///
/// The client calls [`TokenStore::get`] before every attempt and
/// [`TokenStore::clear`] once per observed session expiry. Implementations
/// must make each operation atomic; concurrent writers resolve as last
/// write wins.
pub trait TokenStore: Send + Sync {
    /// Current token, if a session is held.
    fn get(&self) -> Option<String>;
    /// Replaces the stored token.
    fn set(&self, token: String);
    /// Drops the stored token.
    fn clear(&self);
}

/// Process-local [`TokenStore`].
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let held = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("MemoryTokenStore")
            .field("token", &if held { "<redacted>" } else { "<none>" })
            .finish()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Receives the redirect request raised when a session expires.
///
/// The hosting application decides how to navigate. Any
/// `Fn(&str) + Send + Sync` closure is a handler.
pub trait SessionExpiryHandler: Send + Sync {
    fn session_expired(&self, login_path: &str);
}

impl<F> SessionExpiryHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn session_expired(&self, login_path: &str) {
        self(login_path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{MemoryTokenStore, SessionExpiryHandler, TokenStore};

    #[test]
    fn memory_store_get_set_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(), None);
        store.set("abc".to_owned());
        assert_eq!(store.get().as_deref(), Some("abc"));
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn debug_redacts_token() {
        let store = MemoryTokenStore::with_token("secret-token");
        let debug = format!("{store:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn closures_are_handlers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = move |path: &str| sink.lock().expect("lock").push(path.to_owned());
        handler.session_expired("/login");
        assert_eq!(*seen.lock().expect("lock"), vec!["/login".to_owned()]);
    }
}
