//! Persistent key-value storage for cart state.
//!
//! The cart only needs `get`/`set` on string values. Production uses the
//! visitor's session (`PostgreSQL`-backed via tower-sessions); tests use
//! [`MemoryStorage`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tower_sessions::Session;

/// Key holding the JSON array of `{variantId, quantity}` lines.
pub const CART_KEY: &str = "cart";

/// Key holding the JSON-encoded checkout known to this visitor.
pub const CHECKOUT_KEY: &str = "checkout";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Backend is not available.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A string key-value store.
pub trait CartStorage: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// In-process storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.into());
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

impl CartStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Storage scoped to the current visitor's session.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    session: Session,
}

impl SessionStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.session.get::<String>(key).await?)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.session.insert(key, value).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.get(CART_KEY).await.unwrap().is_none());

        storage.set(CART_KEY, "[]".to_string()).await.unwrap();
        assert_eq!(storage.get(CART_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::with_entry(CART_KEY, "[]");
        let other = storage.clone();

        other.set(CART_KEY, "[1]".to_string()).await.unwrap();
        assert_eq!(storage.get(CART_KEY).await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_session_storage() {
        let store = Arc::new(tower_sessions::MemoryStore::default());
        let session = Session::new(None, store, None);
        let storage = SessionStorage::new(session);

        storage.set(CART_KEY, "[]".to_string()).await.unwrap();
        assert_eq!(storage.get(CART_KEY).await.unwrap().as_deref(), Some("[]"));
        assert!(storage.get(CHECKOUT_KEY).await.unwrap().is_none());
    }
}
