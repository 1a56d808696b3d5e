use super::files::{atomic_write, quarantine_file, ensure_dir, read_file, remove_file};
use crate::error::StorageError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The fixed keys under which state is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// JSON array of tasks
    Tasks,
    /// JSON array of categories
    Categories,
    /// Plain id of the task with an in-flight session
    RunningTask,
    /// RFC 3339 start instant of the in-flight session
    SessionStart,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Categories => "categories",
            Self::RunningTask => "running-task",
            Self::SessionStart => "session-start",
        }
    }

    /// File name used by [`FileStore`]
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks.json",
            Self::Categories => "categories.json",
            Self::RunningTask => "running-task",
            Self::SessionStart => "session-start",
        }
    }
}

/// Synchronous string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError>;

    /// Move an unreadable value out of the way so later reads see it as absent.
    /// Returns a description of where it went, if anywhere.
    fn quarantine(&mut self, _key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(None)
    }
}

/// One file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        read_file(&self.path(key))
    }

    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        tracing::debug!(key = key.as_str(), bytes = value.len(), "writing");
        atomic_write(&self.path(key), value)
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        tracing::debug!(key = key.as_str(), "removing");
        remove_file(&self.path(key))
    }

    fn quarantine(&mut self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(quarantine_file(&self.path(key))?.map(|p| p.display().to_string()))
    }
}

/// In-memory storage, used by tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<StorageKey, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: StorageKey) -> bool {
        self.entries.contains_key(&key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(&key).cloned())
    }

    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        self.entries.remove(&key);
        Ok(())
    }
}

/// Memory storage that can be told to refuse writes, for exercising failure paths
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    pub inner: MemoryStore,
    pub fail_writes_to: Option<StorageKey>,
    pub fail_quarantine: bool,
}

#[cfg(test)]
impl FailingStore {
    pub fn contains(&self, key: StorageKey) -> bool {
        self.inner.contains(key)
    }

    fn refuse(&self, action: &'static str, key: StorageKey) -> Result<(), StorageError> {
        if self.fail_writes_to == Some(key) {
            let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
            return Err(StorageError::io(action, key.file_name(), source));
        }
        Ok(())
    }
}

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.refuse("write", key)?;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        self.refuse("remove", key)?;
        self.inner.remove(key)
    }

    fn quarantine(&mut self, key: StorageKey) -> Result<Option<String>, StorageError> {
        if self.fail_quarantine {
            let source = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
            return Err(StorageError::io("move aside", key.file_name(), source));
        }
        self.inner.quarantine(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path().join("data")).unwrap();

        assert_eq!(store.get(StorageKey::RunningTask).unwrap(), None);

        store.set(StorageKey::RunningTask, "task-1").unwrap();
        assert_eq!(store.get(StorageKey::RunningTask).unwrap().as_deref(), Some("task-1"));
        assert!(store.dir().join("running-task").exists());

        store.remove(StorageKey::RunningTask).unwrap();
        assert_eq!(store.get(StorageKey::RunningTask).unwrap(), None);
    }

    #[test]
    fn test_file_store_quarantine() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();

        assert_eq!(store.quarantine(StorageKey::Tasks).unwrap(), None);

        store.set(StorageKey::Tasks, "{not json").unwrap();
        let backup = store.quarantine(StorageKey::Tasks).unwrap().unwrap();
        assert!(backup.contains("tasks.json.bak."));
        assert_eq!(store.get(StorageKey::Tasks).unwrap(), None);
        assert_eq!(store.quarantine(StorageKey::Tasks).unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        store.set(StorageKey::Tasks, "[]").unwrap();
        assert!(store.contains(StorageKey::Tasks));
        assert_eq!(store.get(StorageKey::Tasks).unwrap().as_deref(), Some("[]"));

        store.remove(StorageKey::Tasks).unwrap();
        assert!(!store.contains(StorageKey::Tasks));
        assert_eq!(store.quarantine(StorageKey::Tasks).unwrap(), None);
    }
}
