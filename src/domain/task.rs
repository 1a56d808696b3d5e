use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One contiguous interval of timer activity attributed to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSession {
    pub id: String,
    pub start_time: DateTime<Local>,
    /// `None` while the session is in flight
    pub end_time: Option<DateTime<Local>>,
    /// Whole seconds
    pub duration: u64,
}

impl TimeSession {
    /// Open a new in-flight session starting at `start_time`
    pub fn begin(start_time: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time: None,
            duration: 0,
        }
    }

    /// Whether the session is still in flight
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Recompute the live duration against `now`
    pub fn tick(&mut self, now: DateTime<Local>) {
        if self.is_active() {
            self.duration = elapsed_seconds(self.start_time, now);
        }
    }

    /// Freeze the session at `now`. Calling it twice keeps the first end time.
    pub fn finalize(&mut self, now: DateTime<Local>) {
        if self.is_active() {
            self.duration = elapsed_seconds(self.start_time, now);
            self.end_time = Some(now);
        }
    }
}

/// Whole seconds between two instants, floored and clamped at zero
pub fn elapsed_seconds(start: DateTime<Local>, end: DateTime<Local>) -> u64 {
    let millis = end.signed_duration_since(start).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis / 1000) as u64
    }
}

/// A tracked task with its committed sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Category name (soft reference, not an id)
    pub category: String,
    #[serde(default)]
    sessions: Vec<TimeSession>,
    #[serde(default)]
    total_time: u64,
    pub created_at: DateTime<Local>,
}

impl Task {
    pub fn new(name: String, category: String, description: String, created_at: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            category,
            sessions: Vec::new(),
            total_time: 0,
            created_at,
        }
    }

    /// Finalized sessions in commit order
    pub fn sessions(&self) -> &[TimeSession] {
        &self.sessions
    }

    /// Sum of finalized session durations, in seconds
    pub fn total_time(&self) -> u64 {
        self.total_time
    }

    /// Sessions sorted by start time, newest first
    pub fn sessions_newest_first(&self) -> Vec<&TimeSession> {
        let mut sorted: Vec<&TimeSession> = self.sessions.iter().collect();
        sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sorted
    }

    /// Seconds from sessions that started at or after `since`
    pub fn time_since(&self, since: DateTime<Local>) -> u64 {
        self.sessions
            .iter()
            .filter(|s| s.start_time >= since)
            .map(|s| s.duration)
            .sum()
    }

    /// Merge user-editable fields. Identity, sessions and total time are untouched.
    pub fn apply(&mut self, update: &TaskUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(category) = &update.category {
            self.category = category.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
    }

    /// Append a finalized session. In-flight sessions are rejected.
    pub(crate) fn commit_session(&mut self, session: TimeSession) -> bool {
        if session.is_active() {
            return false;
        }
        self.total_time += session.duration;
        self.sessions.push(session);
        true
    }

    /// Recompute total time from the session list (called after loading from disk).
    /// Returns the previous value when it disagreed.
    pub fn sync_total_from_sessions(&mut self) -> Option<u64> {
        let actual: u64 = self.sessions.iter().map(|s| s.duration).sum();
        if actual == self.total_time {
            return None;
        }
        let previous = self.total_time;
        self.total_time = actual;
        Some(previous)
    }

    /// Drop sessions that were persisted without an end time
    pub(crate) fn discard_open_sessions(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|s| !s.is_active());
        before - self.sessions.len()
    }
}

/// Partial update of a task's user-editable fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.description.is_none()
    }
}
