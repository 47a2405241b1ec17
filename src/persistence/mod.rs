//! Durable per-browser flags
//!
//! Features:
//! - `FlagStore` trait over a key/boolean store
//! - LocalStorage backend (wasm32), JSON file backend (native), in-memory backend
//! - Storage failures degrade to "not played before"

use std::fmt;

pub mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

/// Key of the "has played before" flag
pub const PLAYED_FLAG_KEY: &str = "fizzi_game_played";

/// Storage backend failure
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// No storage in this environment (private mode, disabled, no window)
    Unavailable,
    /// Read or write failed
    Io(String),
    /// Stored data could not be decoded
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::Io(msg) => write!(f, "storage i/o error: {}", msg),
            StorageError::Corrupt(msg) => write!(f, "corrupt storage data: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Key/boolean store that survives page reloads
pub trait FlagStore {
    /// Read a flag; a missing key reads as `false`
    fn load_flag(&self, key: &str) -> Result<bool, StorageError>;
    fn save_flag(&mut self, key: &str, value: bool) -> Result<(), StorageError>;
}

/// Read the played flag, treating any failure as a first-time player
pub fn load_played_before(store: &dyn FlagStore) -> bool {
    match store.load_flag(PLAYED_FLAG_KEY) {
        Ok(played) => {
            log::info!("Played-before flag: {}", played);
            played
        }
        Err(e) => {
            log::warn!("Could not read played flag ({}), assuming first visit", e);
            false
        }
    }
}

/// Write the played flag; failures are logged and otherwise ignored
pub fn mark_played(store: &mut dyn FlagStore) {
    match store.save_flag(PLAYED_FLAG_KEY, true) {
        Ok(()) => log::info!("Played-before flag saved"),
        Err(e) => log::warn!("Could not save played flag: {}", e),
    }
}
