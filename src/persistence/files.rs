use crate::error::StorageError;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the per-project data directory
pub const DATA_DIR_NAME: &str = ".timetrack";

/// Get the data directory - checks for local .timetrack first, then falls back to global ~/.timetrack
pub fn get_data_dir() -> Result<PathBuf> {
    // Check for local .timetrack directory
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_data_dir(&current_dir) {
        return Ok(local_dir);
    }

    // Fall back to global ~/.timetrack
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DATA_DIR_NAME))
}

/// Find local .timetrack directory by walking up the directory tree
pub fn find_local_data_dir(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let candidate = current.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Ensure a directory exists
pub fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| StorageError::io("create directory", dir, e))?;
    }
    Ok(())
}

/// Initialize a local .timetrack directory inside `parent`
pub fn init_local_data_dir(parent: &Path) -> Result<PathBuf> {
    let data_dir = parent.join(DATA_DIR_NAME);

    if data_dir.exists() {
        anyhow::bail!("Data directory already exists: {}", data_dir.display());
    }

    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create directory: {}", data_dir.display()))?;

    Ok(data_dir)
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write(path: &Path, content: &str) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file =
        NamedTempFile::new_in(dir).map_err(|e| StorageError::io("create temporary file in", dir, e))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| StorageError::io("write temporary file for", path, e))?;

    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| StorageError::io("sync temporary file for", path, e))?;

    temp_file
        .persist(path)
        .map_err(|e| StorageError::io("persist", path, e.error))?;

    Ok(())
}

/// Read file content, `None` if the file doesn't exist
pub fn read_file(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::io("read", path, e)),
    }
}

/// Delete a file; a missing file is not an error
pub fn remove_file(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::io("remove", path, e)),
    }
}

/// Move a file aside to `<name>.bak.<timestamp>` so the next read sees it as absent.
/// Returns the backup path, or `None` if there was nothing to move.
pub fn quarantine_file(path: &Path) -> Result<Option<PathBuf>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let backup_path = path.with_file_name(format!("{}.bak.{}", file_name, timestamp));

    fs::rename(path, &backup_path).map_err(|e| StorageError::io("move aside", path, e))?;

    Ok(Some(backup_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir() {
        let dir = get_data_dir().unwrap();
        assert!(dir.to_string_lossy().contains(DATA_DIR_NAME));
    }

    #[test]
    fn test_find_local_data_dir_walks_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().join(DATA_DIR_NAME);
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&data_dir).unwrap();
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_local_data_dir(&nested), Some(data_dir));
    }

    #[test]
    fn test_init_local_data_dir_refuses_existing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let created = init_local_data_dir(temp_dir.path()).unwrap();
        assert!(created.is_dir());
        assert!(init_local_data_dir(temp_dir.path()).is_err());
    }

    #[test]
    fn test_atomic_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        atomic_write(&test_file, "Hello, world!").unwrap();
        assert_eq!(read_file(&test_file).unwrap().as_deref(), Some("Hello, world!"));

        atomic_write(&test_file, "Replaced").unwrap();
        assert_eq!(read_file(&test_file).unwrap().as_deref(), Some("Replaced"));
    }

    #[test]
    fn test_read_nonexistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("nonexistent.txt");

        assert_eq!(read_file(&test_file).unwrap(), None);
    }

    #[test]
    fn test_remove_file_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("marker");

        atomic_write(&test_file, "x").unwrap();
        remove_file(&test_file).unwrap();
        assert!(!test_file.exists());
        remove_file(&test_file).unwrap();
    }

    #[test]
    fn test_quarantine_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("tasks.json");

        assert_eq!(quarantine_file(&test_file).unwrap(), None);

        atomic_write(&test_file, "Original content").unwrap();
        let backup_path = quarantine_file(&test_file).unwrap().unwrap();

        assert!(!test_file.exists());
        assert!(backup_path.exists());
        assert_eq!(
            read_file(&backup_path).unwrap().as_deref(),
            Some("Original content")
        );

        // Nothing left to move on the next load
        assert_eq!(quarantine_file(&test_file).unwrap(), None);
    }
}
