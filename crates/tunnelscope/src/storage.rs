//! Client-local durable storage.
//!
//! The credential is the only value that outlives a session. It lives behind
//! the [`KeyValueStore`] trait so the credential store can run against the
//! on-disk [`FileStore`] in the CLI and a [`MemoryStore`] in tests.
//!
//! ## File Layout
//!
//! ```text
//! ~/.local/share/tunnelscope/
//! └── credentials.json     (key -> value map, owner-only)
//! ```

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::error::{CoreError, Result};

/// Key under which the ngrok API key is persisted.
pub const CREDENTIAL_KEY: &str = "ngrok-api-key";

/// A small string-to-string store that survives restarts.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. Missing keys are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| CoreError::Storage("storage lock poisoned".to_string()))
}

/// Volatile store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.entries)?.len())
    }

    /// Whether the store holds no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(lock(&self.entries)?.is_empty())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// JSON-file store in the user's data directory.
pub struct FileStore {
    path: PathBuf,

    /// Serializes read-modify-write cycles on the file.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined or created.
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| CoreError::Storage("Failed to determine data directory".to_string()))?
            .join("tunnelscope");

        Self::in_dir(&data_dir)
    }

    /// Opens the store inside `data_dir`, creating it owner-only if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its permissions
    /// cannot be set.
    pub fn in_dir(data_dir: &Path) -> Result<Self> {
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(data_dir)
            .map_err(|e| CoreError::Storage(format!("Failed to create data directory: {e}")))?;

        fs::set_permissions(data_dir, fs::Permissions::from_mode(0o700)).map_err(|e| {
            CoreError::Storage(format!("Failed to set data directory permissions: {e}"))
        })?;

        Ok(Self {
            path: data_dir.join("credentials.json"),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let json = fs::read_to_string(&self.path)?;
        if json.trim().is_empty() {
            return Ok(HashMap::new());
        }

        Ok(serde_json::from_str(&json)?)
    }

    /// Atomic write: temp file with owner-only permissions, then rename.
    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let temp_path = self.path.with_extension("tmp");

        fs::write(&temp_path, &json)?;
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        fs::rename(&temp_path, &self.path)?;

        debug!(
            "Persisted {} key(s) to {}",
            entries.len(),
            self.path.display()
        );

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = lock(&self.write_lock)?;
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = lock(&self.write_lock)?;
        let mut entries = self.load()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use tempfile::TempDir;

    fn setup_file_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(&temp_dir.path().join("tunnelscope")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(CREDENTIAL_KEY).unwrap(), None);

        store.set(CREDENTIAL_KEY, "abc").unwrap();
        assert_eq!(store.get(CREDENTIAL_KEY).unwrap().as_deref(), Some("abc"));

        store.remove(CREDENTIAL_KEY).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("tunnelscope");

        FileStore::in_dir(&data_dir)
            .unwrap()
            .set(CREDENTIAL_KEY, "abc")
            .unwrap();

        let reopened = FileStore::in_dir(&data_dir).unwrap();
        assert_eq!(reopened.get(CREDENTIAL_KEY).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_store_remove() {
        let (store, _temp) = setup_file_store();

        store.set(CREDENTIAL_KEY, "abc").unwrap();
        store.set("other", "value").unwrap();
        store.remove(CREDENTIAL_KEY).unwrap();

        assert_eq!(store.get(CREDENTIAL_KEY).unwrap(), None);
        assert_eq!(store.get("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_store_remove_missing_is_noop() {
        let (store, _temp) = setup_file_store();
        store.remove(CREDENTIAL_KEY).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_permissions() {
        let (store, temp) = setup_file_store();
        store.set(CREDENTIAL_KEY, "abc").unwrap();

        let file_mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);

        let dir_mode = fs::metadata(temp.path().join("tunnelscope"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let (store, _temp) = setup_file_store();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.get(CREDENTIAL_KEY), Err(CoreError::Json(_))));
    }
}
