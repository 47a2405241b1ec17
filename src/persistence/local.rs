//! Browser LocalStorage flag store

use web_sys::Storage;

use super::{FlagStore, StorageError};

/// Flags in `window.localStorage`, stored as the string `"true"`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

impl FlagStore for LocalStorage {
    fn load_flag(&self, key: &str) -> Result<bool, StorageError> {
        let storage = Self::storage()?;
        let value = storage
            .get_item(key)
            .map_err(|e| StorageError::Io(format!("{:?}", e)))?;
        // Any non-empty value counts as set
        Ok(value.is_some_and(|v| !v.is_empty()))
    }

    fn save_flag(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        let storage = Self::storage()?;
        let result = if value {
            storage.set_item(key, "true")
        } else {
            storage.remove_item(key)
        };
        result.map_err(|e| StorageError::Io(format!("{:?}", e)))
    }
}
