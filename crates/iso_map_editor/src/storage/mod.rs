//! Persistent key-value storage for the editor session

mod file;

pub use file::FileStore;

use bevy::log::warn;
use iso_map_core::{KeyValueStore, MemoryStore};
use std::path::PathBuf;

/// Open the store the session persists into.
///
/// Uses `dir` when given, otherwise the platform data directory. Falls back to
/// an in-memory store (nothing survives a restart) when neither is usable.
pub fn open_store(dir: Option<PathBuf>) -> Box<dyn KeyValueStore> {
    let store = match dir {
        Some(dir) => Some(FileStore::new(dir)),
        None => FileStore::platform_default(),
    };
    match store {
        Some(store) => {
            bevy::log::info!("Saving maps to {:?}", store.dir());
            Box::new(store)
        }
        None => {
            warn!("No data directory available, local saves will not persist");
            Box::new(MemoryStore::new())
        }
    }
}
