//! In-memory flag store (tests, native demo fallback)

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{FlagStore, StorageError};

/// Flags kept in a shared map.
///
/// Clones share the same map, so a test can keep a handle to the store
/// it hands to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    flags: Rc<RefCell<HashMap<String, bool>>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every read and write
    pub fn unavailable() -> Self {
        Self {
            flags: Rc::default(),
            unavailable: true,
        }
    }

    /// Pre-populated store
    pub fn with_flag(key: &str, value: bool) -> Self {
        let store = Self::new();
        store.flags.borrow_mut().insert(key.to_string(), value);
        store
    }

    /// Peek at a flag without going through `FlagStore`
    pub fn get(&self, key: &str) -> Option<bool> {
        self.flags.borrow().get(key).copied()
    }
}

impl FlagStore for MemoryStore {
    fn load_flag(&self, key: &str) -> Result<bool, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.get(key).unwrap_or(false))
    }

    fn save_flag(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.flags.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flags() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        handle.save_flag("k", true).unwrap();
        assert_eq!(store.get("k"), Some(true));
        assert!(store.load_flag("k").unwrap());
        assert!(!store.load_flag("other").unwrap());
    }

    #[test]
    fn test_unavailable() {
        let mut store = MemoryStore::unavailable();
        assert_eq!(store.load_flag("k"), Err(StorageError::Unavailable));
        assert_eq!(store.save_flag("k", true), Err(StorageError::Unavailable));
    }
}
