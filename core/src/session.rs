//! Authentication state of the running client, persisted across restarts.
//!
//! # Design
//! A `SessionStore` is an explicit value handed to whoever needs it rather
//! than ambient global state. It reads its storage once at open and writes
//! through synchronously on `login`/`logout`. Sessions never expire; they
//! end on logout or when the stored record disappears.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

/// Storage key of the persisted session record.
pub const SESSION_KEY: &str = "auth";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("session record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value persistence for small string records.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    pub username: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    username: String,
}

pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    current: RwLock<Session>,
}

impl SessionStore {
    /// Restores a prior session from `storage` if one is recorded. An
    /// unreadable record starts the store unauthenticated.
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let current = match restore(&storage) {
            Ok(Some(username)) => {
                tracing::info!(%username, "restored session");
                Session {
                    is_authenticated: true,
                    username: Some(username),
                }
            }
            Ok(None) => Session::default(),
            Err(e) => {
                tracing::warn!("ignoring stored session: {e}");
                Session::default()
            }
        };
        Self {
            storage: Box::new(storage),
            current: RwLock::new(current),
        }
    }

    pub fn session(&self) -> Session {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    pub fn username(&self) -> Option<String> {
        self.read().username.clone()
    }

    /// Marks `username` as signed in and persists it. State is only changed
    /// once the write succeeded.
    pub fn login(&self, username: &str) -> Result<(), SessionError> {
        let record = serde_json::to_string(&StoredSession {
            username: username.to_string(),
        })?;
        self.storage.set(SESSION_KEY, &record)?;
        *self.write() = Session {
            is_authenticated: true,
            username: Some(username.to_string()),
        };
        tracing::info!(%username, "logged in");
        Ok(())
    }

    /// Clears state, then the persisted record.
    pub fn logout(&self) -> Result<(), SessionError> {
        *self.write() = Session::default();
        self.storage.remove(SESSION_KEY)?;
        tracing::info!("logged out");
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn restore(storage: &dyn SessionStorage) -> Result<Option<String>, SessionError> {
    let Some(raw) = storage.get(SESSION_KEY)? else {
        return Ok(None);
    };
    let stored: StoredSession = serde_json::from_str(&raw)?;
    Ok(Some(stored.username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_storage_starts_unauthenticated() {
        let store = SessionStore::open(MemoryStorage::new());
        assert_eq!(store.session(), Session::default());
    }

    #[test]
    fn prior_record_restores_session() {
        let storage = MemoryStorage::new();
        storage.set(SESSION_KEY, r#"{"username":"admin"}"#).unwrap();

        let store = SessionStore::open(storage);
        assert!(store.is_authenticated());
        assert_eq!(store.username().as_deref(), Some("admin"));
    }

    #[test]
    fn corrupt_record_is_ignored() {
        let storage = MemoryStorage::new();
        storage.set(SESSION_KEY, "{not json").unwrap();

        let store = SessionStore::open(storage);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn login_then_logout() {
        let store = SessionStore::open(MemoryStorage::new());
        store.login("admin").unwrap();
        assert_eq!(
            store.session(),
            Session {
                is_authenticated: true,
                username: Some("admin".to_string()),
            }
        );

        store.logout().unwrap();
        assert_eq!(store.session(), Session::default());
    }

    #[test]
    fn file_storage_persists_across_stores() {
        let dir = tempfile::tempdir().unwrap();

        let store = SessionStore::open(FileStorage::new(dir.path()));
        store.login("admin").unwrap();
        assert!(dir.path().join("auth.json").exists());

        let reopened = SessionStore::open(FileStorage::new(dir.path()));
        assert_eq!(reopened.username().as_deref(), Some("admin"));

        reopened.logout().unwrap();
        assert!(!dir.path().join("auth.json").exists());
        assert!(!SessionStore::open(FileStorage::new(dir.path())).is_authenticated());
    }

    #[test]
    fn file_storage_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert!(storage.remove(SESSION_KEY).is_ok());
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
    }
}
