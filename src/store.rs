//! Persistent key/value store façade.
//!
//! `Store` is the single durable owner of task and project data. It never
//! fails from the caller's point of view: backend and serialization errors
//! are logged and reported as `None`/`false`. Values are serialized in full
//! before they reach the backend, so a write either lands whole or not at
//! all.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, error};

/// Storage key holding the task collection.
pub const TASKS_KEY: &str = "tasks";

/// Storage key holding the project collection.
pub const PROJECTS_KEY: &str = "projects";

/// Errors raised below the `Store` façade.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse value stored under '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Raw string persistence behind the store.
pub trait Backend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process backend, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("memory backend lock poisoned".to_string()))
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries()?.clear();
        Ok(())
    }
}

/// Handle to the key/value store. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn Backend>,
}

impl Store {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// A store over a fresh `MemoryBackend`.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Read and parse the value under `key`. Missing, unreadable and
    /// unparsable values all yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                error!(key, error = %e, "Error reading from store");
                None
            }
        }
    }

    /// Serialize and write `value` under `key`. Returns `false` on failure.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_set(key, value) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "Error writing to store");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.backend.delete(key) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "Error removing from store");
                false
            }
        }
    }

    pub fn clear(&self) -> bool {
        match self.backend.clear() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Error clearing store");
                false
            }
        }
    }

    fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.read(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Deserialize {
                key: key.to_string(),
                source,
            })
    }

    fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.write(key, &raw)?;
        debug!(key, bytes = raw.len(), "Stored value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    /// Backend whose every operation fails.
    struct BrokenBackend;

    impl Backend for BrokenBackend {
        fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("disk on fire".into()))
        }
        fn write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("quota exceeded".into()))
        }
        fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".into()))
        }
        fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".into()))
        }
    }

    #[test]
    fn set_then_get_returns_value() {
        let store = Store::in_memory();
        assert!(store.set("tasks", &json!([{ "id": 1 }])));
        let value: Option<Value> = store.get("tasks");
        assert_eq!(value, Some(json!([{ "id": 1 }])));
    }

    #[test]
    fn missing_key_is_none() {
        let store = Store::in_memory();
        assert_eq!(store.get::<Value>("projects"), None);
    }

    #[test]
    fn unparsable_value_is_none() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("tasks", "{not json").unwrap();
        let store = Store::new(backend);
        assert_eq!(store.get::<Vec<Value>>("tasks"), None);
    }

    #[test]
    fn remove_and_clear() {
        let store = Store::in_memory();
        store.set("a", &1);
        store.set("b", &2);

        assert!(store.remove("a"));
        assert_eq!(store.get::<i32>("a"), None);
        assert_eq!(store.get::<i32>("b"), Some(2));

        assert!(store.clear());
        assert_eq!(store.get::<i32>("b"), None);
    }

    #[test]
    fn failing_backend_never_errors() {
        let store = Store::new(Arc::new(BrokenBackend));
        assert_eq!(store.get::<Value>("tasks"), None);
        assert!(!store.set("tasks", &json!([])));
        assert!(!store.remove("tasks"));
        assert!(!store.clear());
    }
}
