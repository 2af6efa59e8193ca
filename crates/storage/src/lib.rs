#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError, StoredValue};
