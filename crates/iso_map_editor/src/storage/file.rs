//! File-backed key-value store, one JSON file per key

use directories::ProjectDirs;
use iso_map_core::{KeyValueStore, StorageError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory
    pub fn platform_default() -> Option<Self> {
        ProjectDirs::from("com", "iso_map_editor", "iso_map_editor")
            .map(|dirs| Self::new(dirs.data_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::Unavailable(format!("invalid key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

/// Write to a sibling temp file, sync, then rename over the target
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        atomic_write(&path, value.as_bytes()).map_err(|e| StorageError::Io(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(format!("/tmp/iso_map_editor_file_store_test_{}", name));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_set_get_remove() {
        let dir = test_dir("round_trip");
        let store = FileStore::new(&dir);
        assert_eq!(store.get("save").unwrap(), None);

        store.set("save", "{\"version\":1}").unwrap();
        assert_eq!(store.get("save").unwrap().as_deref(), Some("{\"version\":1}"));
        assert!(dir.join("save.json").exists());
        assert!(!dir.join("save.json.tmp").exists());

        store.remove("save").unwrap();
        assert_eq!(store.get("save").unwrap(), None);
        // Removing a missing key is not an error
        store.remove("save").unwrap();

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = test_dir("overwrite");
        let store = FileStore::new(&dir);
        store.set("save", "first").unwrap();
        store.set("save", "second").unwrap();
        assert_eq!(store.get("save").unwrap().as_deref(), Some("second"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let store = FileStore::new(test_dir("bad_keys"));
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
        assert!(store.remove("a/b").is_err());
    }
}
