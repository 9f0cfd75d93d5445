//! Token store
//!
//! Sole owner of the persisted access/refresh token pair. Every
//! read-modify-write sequence runs under one async mutex so that concurrent
//! calls on a multi-threaded runtime never observe half a pair.

use std::sync::Arc;

use studio_security::is_token_valid;
use studio_shared::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::TokenPair;
use crate::error::StorageError;
use crate::repositories::KeyValueStore;

pub struct TokenStore<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    lock: Mutex<()>,
}

impl<S: KeyValueStore + ?Sized> TokenStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Overwrite both tokens. Token shape is not checked.
    ///
    /// If either write fails both slots are emptied, so a failed `set` never
    /// leaves half a pair (or a new access token beside an old refresh token).
    pub async fn set(&self, access: &str, refresh: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let written = match self.store.set(ACCESS_TOKEN_KEY, access).await {
            Ok(()) => self.store.set(REFRESH_TOKEN_KEY, refresh).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            warn!("Token pair could not be stored, discarding it: {}", e);
            if let Err(cleanup) = self.remove_both().await {
                warn!("Discarding the partial token pair failed: {}", cleanup);
            }
            return Err(e);
        }

        debug!("Token pair stored");
        Ok(())
    }

    /// Current access token, if any.
    pub async fn get(&self) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        self.store.get(ACCESS_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        self.store.get(REFRESH_TOKEN_KEY).await
    }

    /// Both tokens, or `None` unless both are present.
    pub async fn session(&self) -> Result<Option<TokenPair>, StorageError> {
        let _guard = self.lock.lock().await;
        let access = self.store.get(ACCESS_TOKEN_KEY).await?;
        let refresh = self.store.get(REFRESH_TOKEN_KEY).await?;
        Ok(access.zip(refresh).map(|(access, refresh)| TokenPair { access, refresh }))
    }

    /// Remove both tokens. Safe to call on an empty store.
    ///
    /// Both removals are attempted even if the first one fails.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        self.remove_both().await?;
        debug!("Token pair cleared");
        Ok(())
    }

    /// Callers hold the lock.
    async fn remove_both(&self) -> Result<(), StorageError> {
        let access = self.store.remove(ACCESS_TOKEN_KEY).await;
        let refresh = self.store.remove(REFRESH_TOKEN_KEY).await;
        access.and(refresh)
    }

    /// Whether the stored access token exists and has not expired yet.
    pub async fn has_valid_session(&self) -> bool {
        match self.get().await {
            Ok(token) => is_token_valid(token.as_deref()),
            Err(e) => {
                warn!("Could not read access token: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::key_value_store::MockKeyValueStore;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::json;

    fn token_expiring_in(seconds: i64) -> String {
        let exp = chrono::Utc::now().timestamp() + seconds;
        encode(
            &Header::default(),
            &json!({ "exp": exp }),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_set_writes_both_slots() {
        let mut store = MockKeyValueStore::new();
        let mut seq = Sequence::new();
        store
            .expect_set()
            .with(eq(ACCESS_TOKEN_KEY), eq("a.b.c"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        store
            .expect_set()
            .with(eq(REFRESH_TOKEN_KEY), eq("r"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let tokens = TokenStore::new(Arc::new(store));
        tokens.set("a.b.c", "r").await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_refresh_write_discards_the_pair() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .with(eq(ACCESS_TOKEN_KEY), eq("new-access"))
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_set()
            .with(eq(REFRESH_TOKEN_KEY), eq("new-refresh"))
            .times(1)
            .returning(|_, _| Err(StorageError::Io("disk full".into())));
        store
            .expect_remove()
            .with(eq(ACCESS_TOKEN_KEY))
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_remove()
            .with(eq(REFRESH_TOKEN_KEY))
            .times(1)
            .returning(|_| Ok(()));

        let tokens = TokenStore::new(Arc::new(store));
        let result = tokens.set("new-access", "new-refresh").await;
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_clear_attempts_both_slots_even_on_failure() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_remove()
            .with(eq(ACCESS_TOKEN_KEY))
            .times(1)
            .returning(|_| Err(StorageError::Io("read-only".into())));
        store
            .expect_remove()
            .with(eq(REFRESH_TOKEN_KEY))
            .times(1)
            .returning(|_| Ok(()));

        let tokens = TokenStore::new(Arc::new(store));
        assert!(matches!(tokens.clear().await, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_session_requires_both_tokens() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .with(eq(ACCESS_TOKEN_KEY))
            .returning(|_| Ok(Some("access".into())));
        store
            .expect_get()
            .with(eq(REFRESH_TOKEN_KEY))
            .returning(|_| Ok(None));

        let tokens = TokenStore::new(Arc::new(store));
        assert_eq!(tokens.get().await.unwrap().as_deref(), Some("access"));
        assert!(tokens.session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_has_valid_session() {
        let live = token_expiring_in(3600);
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .with(eq(ACCESS_TOKEN_KEY))
            .times(1)
            .returning(move |_| Ok(Some(live.clone())));
        assert!(TokenStore::new(Arc::new(store)).has_valid_session().await);

        let stale = token_expiring_in(-5);
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(stale.clone())));
        assert!(!TokenStore::new(Arc::new(store)).has_valid_session().await);

        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        assert!(!TokenStore::new(Arc::new(store)).has_valid_session().await);
    }

    #[tokio::test]
    async fn test_unreadable_store_means_no_session() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(StorageError::Corrupt("bad json".into())));
        assert!(!TokenStore::new(Arc::new(store)).has_valid_session().await);
    }
}
