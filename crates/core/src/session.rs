//! Access-token store with persistence
//!
//! The token and its absolute expiry are held as one [`Credentials`] value
//! inside a `watch` channel, so readers always see a matching pair and
//! subscribers (the auth gate, UI providers) are woken on every change.
//! Only the credentials are persisted; the initialized flag always starts
//! out false so a restored token is re-validated before it is trusted.

use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::storage::{MemoryStorage, SessionStorage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Default storage key for the persisted session
pub const STORAGE_KEY: &str = "auth-storage";

/// Bearer token paired with the instant it stops being valid
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
    expires_at_ms: i64,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, expires_at_ms: i64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at_ms,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Absolute expiry in milliseconds since the epoch
    pub fn expires_at_ms(&self) -> i64 {
        self.expires_at_ms
    }

    pub fn is_fresh_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

/// Change feed returned by [`Session::subscribe`]; closes when the session is dropped
pub type SessionChanges = watch::Receiver<SessionState>;

/// Snapshot of the session observed by readers and subscribers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub credentials: Option<Credentials>,
    /// The one-time startup validation has completed
    pub initialized: bool,
}

impl SessionState {
    pub fn is_authenticated_at(&self, now_ms: i64) -> bool {
        self.credentials
            .as_ref()
            .is_some_and(|credentials| credentials.is_fresh_at(now_ms))
    }
}

/// Persisted subset of the session
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    access_token: Option<String>,
    token_expires_in: Option<i64>,
}

impl PersistedSession {
    fn from_credentials(credentials: Option<&Credentials>) -> Self {
        Self {
            access_token: credentials.map(|c| c.access_token.clone()),
            token_expires_in: credentials.map(|c| c.expires_at_ms),
        }
    }

    fn into_credentials(self) -> Result<Option<Credentials>, &'static str> {
        match (self.access_token, self.token_expires_in) {
            (Some(token), Some(expires_at_ms)) if !token.is_empty() => {
                Ok(Some(Credentials::new(token, expires_at_ms)))
            }
            (None, None) => Ok(None),
            _ => Err("token and expiry must be stored together"),
        }
    }
}

/// Accepted on-disk shapes; older web builds wrapped the record in an envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Envelope { state: PersistedSession },
    Flat(PersistedSession),
}

impl StoredRecord {
    fn into_persisted(self) -> PersistedSession {
        match self {
            Self::Envelope { state } | Self::Flat(state) => state,
        }
    }
}

/// Process-wide session shared by the HTTP layer and the auth gate
pub struct Session {
    state: watch::Sender<SessionState>,
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
    storage_key: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &*self.state.borrow())
            .field("storage_key", &self.storage_key)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session, hydrating credentials from `storage`
    ///
    /// Hydrated credentials are loaded optimistically; the session is not
    /// initialized until the startup validation has run.
    pub fn restore(
        storage: Arc<dyn SessionStorage>,
        clock: Arc<dyn Clock>,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let credentials = hydrate(storage.as_ref(), &storage_key);
        let (state, _) = watch::channel(SessionState {
            credentials,
            initialized: false,
        });

        Self {
            state,
            storage,
            clock,
            storage_key,
        }
    }

    /// Session backed by in-process storage and the system clock
    pub fn in_memory() -> Self {
        Self::restore(
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock),
            STORAGE_KEY,
        )
    }

    /// Replace the token and its absolute expiry (ms since epoch)
    pub fn set_tokens(&self, access_token: impl Into<String>, expires_at_ms: i64) {
        let credentials = Credentials::new(access_token, expires_at_ms);
        self.state.send_modify(|state| {
            self.persist(Some(&credentials));
            state.credentials = Some(credentials);
        });
        debug!(expires_at_ms, "Stored access token");
    }

    /// Clear the token and expiry; calling it on an empty session is a no-op
    pub fn remove_tokens(&self) {
        let cleared = self.state.send_if_modified(|state| {
            self.persist(None);
            state.credentials.take().is_some()
        });
        if cleared {
            debug!("Cleared access token");
        }
    }

    /// Current token, expired or not
    pub fn token(&self) -> Option<String> {
        self.state
            .borrow()
            .credentials
            .as_ref()
            .map(|credentials| credentials.access_token.clone())
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.state.borrow().credentials.clone()
    }

    /// True iff a token is present and has not reached its expiry
    pub fn has_valid_token(&self) -> bool {
        let now_ms = self.clock.now_ms();
        self.state.borrow().is_authenticated_at(now_ms)
    }

    /// Derived authentication flag, re-evaluated against the clock on every call
    pub fn is_authenticated(&self) -> bool {
        self.has_valid_token()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    /// Record that the startup validation has run
    pub fn finish_initialization(&self) {
        self.state.send_if_modified(|state| !std::mem::replace(&mut state.initialized, true));
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver woken on every change to the session state
    pub fn subscribe(&self) -> SessionChanges {
        self.state.subscribe()
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    fn persist(&self, credentials: Option<&Credentials>) {
        let record = PersistedSession::from_credentials(credentials);
        let result = serde_json::to_string(&record)
            .map_err(CoreError::from)
            .and_then(|json| self.storage.store(&self.storage_key, &json));

        if let Err(err) = result {
            warn!(error = %err, key = %self.storage_key, "Failed to persist session");
        }
    }
}

fn hydrate(storage: &dyn SessionStorage, key: &str) -> Option<Credentials> {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(error = %err, key, "Failed to read persisted session");
            return None;
        }
    };

    let parsed = serde_json::from_str::<StoredRecord>(&raw)
        .map_err(|err| err.to_string())
        .and_then(|record| {
            record
                .into_persisted()
                .into_credentials()
                .map_err(str::to_string)
        });

    match parsed {
        Ok(credentials) => {
            debug!(restored = credentials.is_some(), "Hydrated session");
            credentials
        }
        Err(reason) => {
            warn!(%reason, key, "Discarding unreadable persisted session");
            if let Err(err) = storage.remove(key) {
                warn!(error = %err, key, "Failed to remove unreadable session");
            }
            None
        }
    }
}
