use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A named scalar or set, as the persistence layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StoredValue {
    Int(i64),
    Bool(bool),
    Text(String),
    StringSet(BTreeSet<String>),
}

impl StoredValue {
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StoredValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StoredValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoredValue::Text(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_string_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            StoredValue::StringSet(value) => Some(value),
            _ => None,
        }
    }
}

/// Repository contract for named values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value by key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or the stored value
    /// cannot be decoded.
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError>;

    /// Write several values as one unit: either all land or none do.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the values cannot be stored.
    async fn set_many(&self, entries: &[(&str, StoredValue)]) -> Result<(), StorageError>;

    /// Delete the given keys. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;

    /// Fetch a value, falling back to `default` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_or(&self, key: &str, default: StoredValue) -> Result<StoredValue, StorageError> {
        Ok(self.get(key).await?.unwrap_or(default))
    }

    /// Persist a single value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: StoredValue) -> Result<(), StorageError> {
        self.set_many(&[(key, value)]).await
    }
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<String, StoredValue>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, StoredValue)]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for (key, value) in entries {
            guard.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub values: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let values: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        Self { values }
    }
}
