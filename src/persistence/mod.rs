//! Save/load of flat key/value blobs
//!
//! Each save is a single JSON value under one key, overwritten wholesale.
//! There is no versioning: a blob that fails to parse is logged and replaced
//! by defaults, never surfaced to the player.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(target_arch = "wasm32")]
mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

/// Errors from writing a save
#[derive(Debug, Clone, PartialEq)]
pub enum PersistError {
    /// The value could not be encoded
    Serialize(String),
    /// No backing store (e.g. private browsing)
    Unavailable,
    /// The backing store rejected the write
    WriteFailed(String),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Serialize(msg) => write!(f, "Serialize failed: {}", msg),
            PersistError::Unavailable => write!(f, "Storage unavailable"),
            PersistError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
        }
    }
}

impl std::error::Error for PersistError {}

/// A flat string key/value store
pub trait Storage {
    /// Raw blob for `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Replace the blob for `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// In-memory store for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization
    pub fn insert(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.insert(key, value);
        Ok(())
    }
}

/// Decode `key`, or fall back to `T::default()` when missing or malformed
pub fn load_or_default<T>(storage: &dyn Storage, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(json) = storage.get(key) else {
        log::info!("No save under {}, starting fresh", key);
        return T::default();
    };

    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Malformed save under {} ({}), using defaults", key, e);
            T::default()
        }
    }
}

/// Encode `value` and overwrite `key`
pub fn save_json<T: Serialize>(
    storage: &mut dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(value).map_err(|e| PersistError::Serialize(e.to_string()))?;
    storage.set(key, &json)
}
