use super::kv::{KeyValueStore, StorageKey};
use crate::domain::{default_categories, Category, Task};
use crate::error::StorageError;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Serialize a collection for storage under `key`
pub fn encode<T: Serialize + ?Sized>(key: StorageKey, value: &T) -> Result<String, StorageError> {
    serde_json::to_string_pretty(value).map_err(|source| StorageError::Encode {
        key: key.as_str(),
        source,
    })
}

/// Load the task collection.
///
/// A missing payload yields an empty list. A malformed one is quarantined, logged and
/// also yields an empty list. Loaded tasks get their total time re-synced from their
/// sessions, and any session persisted without an end time is dropped.
pub fn load_tasks<S: KeyValueStore>(storage: &mut S) -> Result<Vec<Task>, StorageError> {
    let Some(raw) = storage.get(StorageKey::Tasks)? else {
        return Ok(Vec::new());
    };

    let mut tasks: Vec<Task> = match serde_json::from_str(&raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::warn!(error = %e, "stored tasks are malformed, starting empty");
            set_aside(storage, StorageKey::Tasks);
            return Ok(Vec::new());
        }
    };

    for task in &mut tasks {
        let dropped = task.discard_open_sessions();
        if dropped > 0 {
            tracing::warn!(task = %task.id, dropped, "dropped unfinished sessions from stored task");
        }
        if let Some(stored) = task.sync_total_from_sessions() {
            tracing::warn!(
                task = %task.id,
                stored,
                actual = task.total_time(),
                "stored total time disagreed with sessions"
            );
        }
    }

    Ok(tasks)
}

/// Load the category collection, falling back to the defaults
pub fn load_categories<S: KeyValueStore>(storage: &mut S) -> Result<Vec<Category>, StorageError> {
    let Some(raw) = storage.get(StorageKey::Categories)? else {
        return Ok(default_categories());
    };

    match serde_json::from_str(&raw) {
        Ok(categories) => Ok(categories),
        Err(e) => {
            tracing::warn!(error = %e, "stored categories are malformed, using defaults");
            set_aside(storage, StorageKey::Categories);
            Ok(default_categories())
        }
    }
}

/// Quarantine a malformed payload. Failing to do so never blocks loading.
fn set_aside<S: KeyValueStore>(storage: &mut S, key: StorageKey) {
    match storage.quarantine(key) {
        Ok(Some(backup)) => tracing::warn!(key = key.as_str(), %backup, "moved malformed payload aside"),
        Ok(None) => {}
        Err(e) => tracing::warn!(key = key.as_str(), error = %e, "could not move malformed payload aside"),
    }
}

/// Durable record of an in-flight session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningMarker {
    pub task_id: String,
    pub started_at: DateTime<Local>,
}

/// Read the running-task markers. Both keys must be present and parseable;
/// a half-written or malformed pair is cleared and reported as absent.
pub fn read_running_marker<S: KeyValueStore>(storage: &mut S) -> Result<Option<RunningMarker>, StorageError> {
    let task_id = storage.get(StorageKey::RunningTask)?;
    let started_at = storage.get(StorageKey::SessionStart)?;

    let (task_id, started_at) = match (task_id, started_at) {
        (None, None) => return Ok(None),
        (Some(task_id), Some(started_at)) => (task_id, started_at),
        _ => {
            tracing::warn!("incomplete running-task markers, clearing");
            clear_running_marker(storage)?;
            return Ok(None);
        }
    };

    let task_id = task_id.trim().to_string();
    match DateTime::parse_from_rfc3339(started_at.trim()) {
        Ok(started_at) if !task_id.is_empty() => Ok(Some(RunningMarker {
            task_id,
            started_at: started_at.with_timezone(&Local),
        })),
        Ok(_) => {
            tracing::warn!("empty running-task marker, clearing");
            clear_running_marker(storage)?;
            Ok(None)
        }
        Err(e) => {
            tracing::warn!(error = %e, "malformed session-start marker, clearing");
            clear_running_marker(storage)?;
            Ok(None)
        }
    }
}

/// Persist the running-task markers
pub fn write_running_marker<S: KeyValueStore>(storage: &mut S, marker: &RunningMarker) -> Result<(), StorageError> {
    storage.set(StorageKey::RunningTask, &marker.task_id)?;
    storage.set(StorageKey::SessionStart, &marker.started_at.to_rfc3339())?;
    Ok(())
}

/// Remove the running-task markers
pub fn clear_running_marker<S: KeyValueStore>(storage: &mut S) -> Result<(), StorageError> {
    storage.remove(StorageKey::RunningTask)?;
    storage.remove(StorageKey::SessionStart)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeSession;
    use crate::persistence::{FailingStore, FileStore, MemoryStore};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn sample_task() -> Task {
        let created = Local.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let mut task = Task::new("Write report".to_string(), "work".to_string(), "Q1".to_string(), created);
        let mut session = TimeSession::begin(created + Duration::minutes(5));
        session.finalize(created + Duration::minutes(7));
        task.commit_session(session);
        task
    }

    #[test]
    fn test_tasks_round_trip() {
        let mut storage = MemoryStore::new();
        let tasks = vec![sample_task()];
        storage.set(StorageKey::Tasks, &encode(StorageKey::Tasks, &tasks).unwrap()).unwrap();

        let loaded = load_tasks(&mut storage).unwrap();
        assert_eq!(loaded, tasks);
        assert_eq!(loaded[0].total_time(), 120);
    }

    #[test]
    fn test_missing_payloads_use_fallbacks() {
        let mut storage = MemoryStore::new();
        assert!(load_tasks(&mut storage).unwrap().is_empty());
        assert_eq!(load_categories(&mut storage).unwrap(), default_categories());
    }

    #[test]
    fn test_malformed_payloads_use_fallbacks() {
        let mut storage = MemoryStore::new();
        storage.set(StorageKey::Tasks, "{\"oops\":").unwrap();
        storage.set(StorageKey::Categories, "42").unwrap();

        assert!(load_tasks(&mut storage).unwrap().is_empty());
        assert_eq!(load_categories(&mut storage).unwrap(), default_categories());
    }

    #[test]
    fn test_malformed_payloads_load_when_quarantine_fails() {
        let mut storage = FailingStore {
            fail_quarantine: true,
            ..Default::default()
        };
        storage.inner.set(StorageKey::Tasks, "[{").unwrap();
        storage.inner.set(StorageKey::Categories, "nope").unwrap();

        assert!(load_tasks(&mut storage).unwrap().is_empty());
        assert_eq!(load_categories(&mut storage).unwrap(), default_categories());
    }

    #[test]
    fn test_malformed_file_is_moved_aside_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = FileStore::open(temp_dir.path()).unwrap();
        storage.set(StorageKey::Tasks, "{\"oops\":").unwrap();

        assert!(load_tasks(&mut storage).unwrap().is_empty());
        assert!(load_tasks(&mut storage).unwrap().is_empty());

        let backups = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("tasks.json.bak."))
            .count();
        assert_eq!(backups, 1);
        assert_eq!(storage.get(StorageKey::Tasks).unwrap(), None);
    }

    #[test]
    fn test_load_browser_shaped_payload() {
        let raw = r#"[{
            "id": "task-1700000000000",
            "name": "Read",
            "description": "",
            "category": "study",
            "sessions": [{
                "id": "session-1700000001000",
                "startTime": "2024-01-10T10:00:00.000Z",
                "endTime": "2024-01-10T10:30:00.000Z",
                "duration": 1800
            }],
            "totalTime": 1800,
            "createdAt": "2024-01-10T09:00:00.000Z"
        }]"#;
        let mut storage = MemoryStore::new();
        storage.set(StorageKey::Tasks, raw).unwrap();

        let tasks = load_tasks(&mut storage).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "task-1700000000000");
        let start = tasks[0].sessions()[0].start_time;
        assert_eq!(start.timestamp(), 1_704_880_800);
    }

    #[test]
    fn test_load_resyncs_total_and_drops_open_sessions() {
        let raw = r#"[{
            "id": "t",
            "name": "Read",
            "category": "study",
            "sessions": [
                {"id": "a", "startTime": "2024-01-10T10:00:00Z", "endTime": "2024-01-10T10:01:00Z", "duration": 60},
                {"id": "b", "startTime": "2024-01-10T11:00:00Z", "endTime": null, "duration": 10}
            ],
            "totalTime": 999,
            "createdAt": "2024-01-10T09:00:00Z"
        }]"#;
        let mut storage = MemoryStore::new();
        storage.set(StorageKey::Tasks, raw).unwrap();

        let tasks = load_tasks(&mut storage).unwrap();
        assert_eq!(tasks[0].sessions().len(), 1);
        assert_eq!(tasks[0].total_time(), 60);
    }

    #[test]
    fn test_running_marker_round_trip() {
        let mut storage = MemoryStore::new();
        let marker = RunningMarker {
            task_id: "task-1".to_string(),
            started_at: Local.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
        };

        write_running_marker(&mut storage, &marker).unwrap();
        assert_eq!(read_running_marker(&mut storage).unwrap(), Some(marker));

        clear_running_marker(&mut storage).unwrap();
        assert_eq!(read_running_marker(&mut storage).unwrap(), None);
    }

    #[test]
    fn test_malformed_running_marker_is_cleared() {
        let mut storage = MemoryStore::new();
        storage.set(StorageKey::RunningTask, "task-1").unwrap();
        storage.set(StorageKey::SessionStart, "yesterday-ish").unwrap();

        assert_eq!(read_running_marker(&mut storage).unwrap(), None);
        assert!(!storage.contains(StorageKey::RunningTask));
        assert!(!storage.contains(StorageKey::SessionStart));
    }

    #[test]
    fn test_half_written_running_marker_is_cleared() {
        let mut storage = MemoryStore::new();
        storage.set(StorageKey::RunningTask, "task-1").unwrap();

        assert_eq!(read_running_marker(&mut storage).unwrap(), None);
        assert!(!storage.contains(StorageKey::RunningTask));
    }
}
