mod config;
pub mod database;

pub use config::{Config, DiagnosisConfig, HabitConfig, InterpretConfig};
pub use database::Database;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{CoreError, DatabaseError};

/// Store document keys.
pub mod keys {
    pub const HABIT: &str = "habit";
    pub const COLLECTION: &str = "collection";
    pub const SPIRIT: &str = "spirit";
    pub const LANTERN: &str = "lantern";
    pub const REFLECTION: &str = "reflection";
    pub const ACTION_LOG: &str = "action_log";
    pub const DIAGNOSIS: &str = "diagnosis";
}

/// Returns `~/.config/shadowlantern[-dev]/` based on SHADOWLANTERN_ENV.
///
/// Set SHADOWLANTERN_ENV=dev to use development data directory.
/// SHADOWLANTERN_DATA_DIR overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("SHADOWLANTERN_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SHADOWLANTERN_ENV")
                .unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("shadowlantern-dev")
            } else {
                base_dir.join("shadowlantern")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Flat key-value persistence for store documents.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), DatabaseError>;
    fn remove(&mut self, key: &str) -> Result<(), DatabaseError>;
}

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), DatabaseError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Load a JSON document, or `T::default()` when the key is absent.
///
/// # Errors
/// Fails on storage errors or a document that does not deserialize.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<T, CoreError>
where
    T: DeserializeOwned + Default,
    S: KvStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => {
            debug!(key, "no stored document, using default");
            Ok(T::default())
        }
    }
}

/// Serialize and store a JSON document.
///
/// # Errors
/// Fails on serialization or storage errors.
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), CoreError>
where
    T: Serialize,
    S: KvStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    Ok(())
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    const SERVICE: &str = "shadowlantern";

    pub fn get(key: &str) -> Result<Option<String>, keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)
    }

    pub fn delete(key: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HabitTracker;

    #[test]
    fn missing_document_loads_default() {
        let store = MemoryStore::new();
        let tracker: HabitTracker = load_json(&store, keys::HABIT).unwrap();
        assert_eq!(tracker, HabitTracker::default());
    }

    #[test]
    fn documents_roundtrip_through_any_store() {
        let mut tracker = HabitTracker::default();
        tracker.streak = 4;
        tracker.total_completions = 9;

        let mut memory = MemoryStore::new();
        save_json(&mut memory, keys::HABIT, &tracker).unwrap();
        assert_eq!(load_json::<HabitTracker, _>(&memory, keys::HABIT).unwrap(), tracker);

        let mut db = Database::open_memory().unwrap();
        save_json(&mut db, keys::HABIT, &tracker).unwrap();
        assert_eq!(load_json::<HabitTracker, _>(&db, keys::HABIT).unwrap(), tracker);
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let mut store = MemoryStore::new();
        store.set(keys::HABIT, "not json").unwrap();
        assert!(matches!(
            load_json::<HabitTracker, _>(&store, keys::HABIT),
            Err(CoreError::Json(_))
        ));
    }
}
