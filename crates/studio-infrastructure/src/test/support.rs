use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use studio_core::{KeyValueStore, StorageError};
use studio_shared::config::ApiSettings;
use wiremock::MockServer;

use crate::{MemoryStore, SessionClient};

/// A signed access token whose `exp` is `seconds` from now.
pub fn token_expiring_in(seconds: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + seconds;
    encode(
        &Header::default(),
        &json!({ "exp": exp, "user_id": 42, "token_type": "access" }),
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

pub fn client_for_url(base_url: &str) -> (SessionClient<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let settings = ApiSettings {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    };
    let client = SessionClient::new(&settings, store.clone()).unwrap();
    (client, store)
}

pub fn client_for(server: &MockServer) -> (SessionClient<MemoryStore>, Arc<MemoryStore>) {
    client_for_url(&server.uri())
}

/// Client with a live token pair already stored. Returns the access token.
pub async fn logged_in_client(
    server: &MockServer,
) -> (SessionClient<MemoryStore>, Arc<MemoryStore>, String) {
    let (client, store) = client_for(server);
    let access = token_expiring_in(3600);
    client.tokens().set(&access, "refresh-token").await.unwrap();
    (client, store, access)
}

/// Nothing listens here, so connecting fails immediately.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

/// Memory-backed store that refuses to write the refresh token slot.
#[derive(Default)]
pub struct RefreshWriteFails {
    pub inner: MemoryStore,
}

#[async_trait]
impl KeyValueStore for RefreshWriteFails {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == "refresh_token" {
            return Err(StorageError::Io("disk full".into()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}
