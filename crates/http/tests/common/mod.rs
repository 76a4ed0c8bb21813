//! Shared fixtures for the client integration tests

#![allow(dead_code)]

use railo_core::tests::ManualClock;
use railo_core::{MemoryStorage, STORAGE_KEY, Session};
use railo_http::RailClient;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fixed "now" of every test clock
pub const NOW: i64 = 1_700_000_000_000;

pub struct Fixture {
    pub server: MockServer,
    pub clock: Arc<ManualClock>,
    pub storage: Arc<MemoryStorage>,
    pub session: Arc<Session>,
    pub client: RailClient,
}

impl Fixture {
    /// Empty session against a fresh mock server
    pub async fn new() -> Self {
        Self::with_storage(MemoryStorage::new()).await
    }

    /// Session hydrated with `token` expiring at `expires_at_ms`
    pub async fn with_token(token: &str, expires_at_ms: i64) -> Self {
        let record = json!({ "accessToken": token, "tokenExpiresIn": expires_at_ms });
        Self::with_storage(MemoryStorage::with_entry(STORAGE_KEY, record.to_string())).await
    }

    async fn with_storage(storage: MemoryStorage) -> Self {
        let server = MockServer::start().await;
        let clock = Arc::new(ManualClock::new(NOW));
        let storage = Arc::new(storage);
        let session = Arc::new(Session::restore(
            storage.clone(),
            clock.clone(),
            STORAGE_KEY,
        ));
        let client = RailClient::builder()
            .base_url(server.uri())
            .session(Arc::clone(&session))
            .reissue_timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        Self {
            server,
            clock,
            storage,
            session,
            client,
        }
    }

    /// Persisted record as JSON
    pub fn persisted(&self) -> Option<Value> {
        use railo_core::SessionStorage;
        self.storage
            .load(STORAGE_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }
}

pub fn issued(token: &str, expires_in_secs: i64) -> Value {
    json!({
        "message": "reissued",
        "result": { "accessToken": token, "accessTokenExpiresIn": expires_in_secs }
    })
}

pub fn envelope(result: Value) -> Value {
    json!({ "message": "ok", "result": result })
}

/// Mount a reissue endpoint answering `response`
pub async fn mount_reissue(server: &MockServer, at: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(at))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}
