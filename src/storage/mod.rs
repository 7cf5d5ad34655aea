// src/storage/mod.rs

//! Durable key-value storage for answers that must survive a reload or crash.

pub mod cache;
pub mod debounce;

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use regex::Regex;

use crate::error::AppError;

pub use cache::{AnswerCache, CachedRecord, Clock, ManualClock, SystemClock};
pub use debounce::DebouncedSaver;

/// Synchronous string store, the moral equivalent of a browser's local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
    fn keys(&self) -> Result<Vec<String>, AppError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, AppError> {
        Ok(self.entries()?.keys().cloned().collect())
    }
}

/// One `<key>.json` file per entry inside a directory.
///
/// Writes go through a temporary file and a rename, so a crash mid-write
/// leaves either the old value or the new one.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    key_pattern: Regex,
}

const FILE_SUFFIX: &str = ".json";

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let key_pattern = Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9_.-]*$")
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(Self { dir, key_pattern })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        if !self.key_pattern.is_match(key) {
            return Err(AppError::Storage(format!("Invalid storage key: {}", key)));
        }
        Ok(self.dir.join(format!("{}{}", key, FILE_SUFFIX)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, AppError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(key) = name.strip_suffix(FILE_SUFFIX) {
                if self.key_pattern.is_match(key) {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("exam-client-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = temp_dir();
        {
            let store = FileStore::open(&dir).unwrap();
            store.set("exam-41-answers", "{}").unwrap();
        }

        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(reopened.get("exam-41-answers").unwrap().as_deref(), Some("{}"));
        assert_eq!(reopened.keys().unwrap(), vec!["exam-41-answers".to_string()]);

        reopened.remove("exam-41-answers").unwrap();
        reopened.remove("exam-41-answers").unwrap();
        assert!(reopened.get("exam-41-answers").unwrap().is_none());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = temp_dir();
        let store = FileStore::open(&dir).unwrap();
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get(".hidden").is_err());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn memory_store_lists_keys() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
