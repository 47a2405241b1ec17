//! JSON file flag store for native builds

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{FlagStore, StorageError};

/// Flags kept as a JSON object in a single file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, bool>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => {
                serde_json::from_str(&json).map_err(|e| StorageError::Corrupt(e.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}

impl FlagStore for FileStore {
    fn load_flag(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.read_all()?.get(key).copied().unwrap_or(false))
    }

    fn save_flag(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking the write
        let mut flags = match self.read_all() {
            Ok(flags) => flags,
            Err(StorageError::Corrupt(msg)) => {
                log::warn!("Replacing corrupt flag file {}: {}", self.path.display(), msg);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        flags.insert(key.to_string(), value);
        let json =
            serde_json::to_string_pretty(&flags).map_err(|e| StorageError::Io(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "fizzi_zone_test_{}_{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_missing_file_reads_false() {
        let store = FileStore::new(temp_path("missing"));
        assert_eq!(store.load_flag("k"), Ok(false));
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("reload");
        let mut store = FileStore::new(&path);
        store.save_flag("k", true).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.load_flag("k"), Ok(true));
        assert_eq!(reopened.load_flag("other"), Ok(false));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file() {
        let path = temp_path("corrupt");
        fs::write(&path, "{ nope").unwrap();
        let mut store = FileStore::new(&path);
        assert!(matches!(store.load_flag("k"), Err(StorageError::Corrupt(_))));

        store.save_flag("k", true).unwrap();
        assert_eq!(store.load_flag("k"), Ok(true));
        let _ = fs::remove_file(&path);
    }
}
