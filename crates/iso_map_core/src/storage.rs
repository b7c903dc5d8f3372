//! Key-value persistence seam
//!
//! The session only needs string get/set/remove. The editor crate provides a
//! file-backed store; [`MemoryStore`] serves headless use and tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// Errors that can occur when using a key-value store
#[derive(Debug)]
pub enum StorageError {
    /// Underlying read/write failed
    Io(String),
    /// The value could not be encoded
    Serialize(String),
    /// The store cannot be used at all (missing directory, quota, poisoned lock)
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Serialize(e) => write!(f, "Serialization error: {}", e),
            StorageError::Unavailable(e) => write!(f, "Storage unavailable: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

/// String-keyed persistent storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Which operations a [`MemoryStore`] allows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Access {
    #[default]
    ReadWrite,
    ReadOnly,
    None,
}

/// In-memory store, optionally rejecting writes or all access
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    access: Access,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, like a browser with storage disabled
    pub fn read_only() -> Self {
        Self {
            entries: RwLock::default(),
            access: Access::ReadOnly,
        }
    }

    /// A store where every operation fails, reads included
    pub fn unavailable() -> Self {
        Self {
            entries: RwLock::default(),
            access: Access::None,
        }
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    fn check_readable(&self) -> Result<(), StorageError> {
        if self.access == Access::None {
            return Err(StorageError::Unavailable("store is unavailable".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        match self.access {
            Access::ReadWrite => Ok(()),
            Access::ReadOnly => Err(StorageError::Unavailable("store is read-only".to_string())),
            Access::None => Err(StorageError::Unavailable("store is unavailable".to_string())),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_readable()?;
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
