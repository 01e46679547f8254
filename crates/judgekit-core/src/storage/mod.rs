mod config;
pub mod database;
pub mod lenient;
mod memory;

pub use config::{Config, DeckConfig, DisplayConfig, RoundTimerConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the judgekit data directory, creating it if needed.
///
/// Resolution order:
/// 1. `JUDGEKIT_DATA_DIR` if set
/// 2. `~/.config/judgekit-dev/` when `JUDGEKIT_ENV=dev`
/// 3. `~/.config/judgekit/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("JUDGEKIT_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("JUDGEKIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("judgekit-dev")
            } else {
                base_dir.join("judgekit")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(StorageError::DataDir)?;
    Ok(dir)
}

/// Origin-scoped byte store addressed by string keys.
///
/// Reads and writes are synchronous. There is no locking or compare-and-set:
/// two writers racing on the same key resolve as last write wins.
pub trait KeyValueStore {
    /// Read the raw bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the bytes stored under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// A state record persisted as one JSON blob under a fixed key.
///
/// `from_json` must be total: any partial or mistyped input yields a
/// well-formed value with absent fields defaulted.
pub trait Persisted: Sized + Default {
    const KEY: &'static str;

    fn from_json(value: &serde_json::Value) -> Self;

    fn to_json(&self) -> serde_json::Value;

    /// Read the record, falling back to defaults on any failure.
    fn load(store: &impl KeyValueStore) -> Self {
        match store.get(Self::KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(value) => Self::from_json(&value),
                Err(e) => {
                    tracing::warn!(key = Self::KEY, error = %e, "discarding unreadable persisted state");
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(key = Self::KEY, error = %e, "store read failed, using defaults");
                Self::default()
            }
        }
    }

    /// Write the record under its key.
    ///
    /// # Errors
    /// Returns an error if the store rejects the write.
    fn save(&self, store: &impl KeyValueStore) -> Result<(), StorageError> {
        let bytes = self.to_json().to_string().into_bytes();
        store.set(Self::KEY, &bytes)
    }
}

/// Read a raw (non-JSON) string value, as stored for simple preferences.
pub fn get_string(store: &impl KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(Some(bytes)) => String::from_utf8(bytes).ok(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Counter {
        n: i64,
    }

    impl Persisted for Counter {
        const KEY: &'static str = "counter";

        fn from_json(value: &serde_json::Value) -> Self {
            Self {
                n: lenient::int(value, "n", 0),
            }
        }

        fn to_json(&self) -> serde_json::Value {
            serde_json::json!({ "n": self.n })
        }
    }

    #[test]
    fn load_missing_key_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Counter::load(&store), Counter::default());
    }

    #[test]
    fn load_garbage_bytes_defaults() {
        let store = MemoryStore::new();
        store.set("counter", b"{not json").unwrap();
        assert_eq!(Counter::load(&store), Counter::default());
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        Counter { n: 7 }.save(&store).unwrap();
        assert_eq!(Counter::load(&store), Counter { n: 7 });
    }

    #[test]
    fn raw_string_values() {
        let store = MemoryStore::new();
        assert_eq!(get_string(&store, "locale"), None);
        store.set("locale", b"pt").unwrap();
        assert_eq!(get_string(&store, "locale").as_deref(), Some("pt"));
    }
}
