use crate::domain::{elapsed_seconds, TimeSession};
use crate::error::StorageError;
use crate::persistence::{clear_running_marker, read_running_marker, write_running_marker, KeyValueStore, RunningMarker};
use crate::store::TaskStore;
use crate::ticker::{tick_duration, Ticker};
use chrono::{DateTime, Duration, Local};

/// The in-flight session and the task it belongs to
#[derive(Debug, Clone)]
pub struct ActiveSession {
    task_id: String,
    session: TimeSession,
    ticker: Ticker,
}

impl ActiveSession {
    fn begin(task_id: &str, started_at: DateTime<Local>, now: DateTime<Local>, tick: Duration) -> Self {
        let mut session = TimeSession::begin(started_at);
        session.tick(now);
        Self {
            task_id: task_id.to_string(),
            session,
            ticker: Ticker::start(tick, now),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn session(&self) -> &TimeSession {
        &self.session
    }
}

#[derive(Debug, Clone, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running(ActiveSession),
}

/// A session that just left the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedSession {
    pub task_id: String,
    pub session: TimeSession,
}

/// What `start` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session began; `previous` is the session it displaced, if any
    Started { previous: Option<StoppedSession> },
    /// The task already has the in-flight session
    AlreadyRunning,
    /// No such task
    UnknownTask,
}

/// At most one in-flight session. `Idle` ⇄ `Running`; the running state owns the
/// session and its ticker, so leaving it cancels the tick source with it.
#[derive(Debug)]
pub struct TimerEngine {
    state: TimerState,
    tick_interval: Duration,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(tick_duration())
    }
}

impl TimerEngine {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            state: TimerState::Idle,
            tick_interval,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running(_))
    }

    pub fn active_task_id(&self) -> Option<&str> {
        match &self.state {
            TimerState::Running(active) => Some(active.task_id()),
            TimerState::Idle => None,
        }
    }

    pub fn current_session(&self) -> Option<&TimeSession> {
        match &self.state {
            TimerState::Running(active) => Some(active.session()),
            TimerState::Idle => None,
        }
    }

    /// Begin timing `task_id`. A different running task is stopped and committed first.
    pub fn start<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        task_id: &str,
        now: DateTime<Local>,
    ) -> Result<StartOutcome, StorageError> {
        if store.get_task(task_id).is_none() {
            tracing::debug!(task = %task_id, "start ignored, unknown task");
            return Ok(StartOutcome::UnknownTask);
        }
        if self.active_task_id() == Some(task_id) {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let previous = self.stop(store, now)?;

        let active = ActiveSession::begin(task_id, now, now, self.tick_interval);
        write_running_marker(
            store.storage_mut(),
            &RunningMarker {
                task_id: task_id.to_string(),
                started_at: now,
            },
        )?;
        tracing::info!(task = %task_id, session = %active.session.id, "timer started");
        self.state = TimerState::Running(active);

        Ok(StartOutcome::Started { previous })
    }

    /// Finalize the in-flight session and commit it to its task. No-op when idle.
    ///
    /// The running markers are cleared only after the session is written, so a
    /// failed write leaves the timer running and resumable.
    pub fn stop<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        now: DateTime<Local>,
    ) -> Result<Option<StoppedSession>, StorageError> {
        let Some(stopped) = self.finalized(now) else {
            return Ok(None);
        };

        let committed = store.commit_session(&stopped.task_id, stopped.session.clone())?;
        self.leave_running(store)?;

        if committed {
            tracing::info!(
                task = %stopped.task_id,
                duration = stopped.session.duration,
                "timer stopped"
            );
        } else {
            tracing::warn!(task = %stopped.task_id, "timer stopped but its task is gone, session dropped");
        }
        Ok(Some(stopped))
    }

    /// Finalize the in-flight session without committing it. No-op when idle.
    pub fn abandon<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        now: DateTime<Local>,
    ) -> Result<Option<StoppedSession>, StorageError> {
        let Some(stopped) = self.finalized(now) else {
            return Ok(None);
        };

        self.leave_running(store)?;
        tracing::info!(
            task = %stopped.task_id,
            duration = stopped.session.duration,
            "timer stopped, session discarded"
        );
        Ok(Some(stopped))
    }

    /// The in-flight session as it would be if stopped at `now`
    fn finalized(&self, now: DateTime<Local>) -> Option<StoppedSession> {
        let TimerState::Running(active) = &self.state else {
            return None;
        };
        let mut session = active.session.clone();
        session.finalize(now);
        Some(StoppedSession {
            task_id: active.task_id.clone(),
            session,
        })
    }

    /// Leave `Running`: dropping the state cancels the ticker, then the markers go
    fn leave_running<S: KeyValueStore>(&mut self, store: &mut TaskStore<S>) -> Result<(), StorageError> {
        self.state = TimerState::Idle;
        clear_running_marker(store.storage_mut())
    }

    /// Re-enter `Running` from persisted markers after a restart.
    ///
    /// The resumed session keeps the persisted start instant but gets a fresh id.
    /// Markers naming a task that no longer exists are cleared.
    pub fn resume<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        now: DateTime<Local>,
    ) -> Result<bool, StorageError> {
        if self.is_running() {
            return Ok(false);
        }
        let Some(marker) = read_running_marker(store.storage_mut())? else {
            return Ok(false);
        };
        if store.get_task(&marker.task_id).is_none() {
            tracing::warn!(task = %marker.task_id, "running task no longer exists, clearing markers");
            clear_running_marker(store.storage_mut())?;
            return Ok(false);
        }

        let active = ActiveSession::begin(&marker.task_id, marker.started_at, now, self.tick_interval);
        tracing::info!(
            task = %marker.task_id,
            elapsed = elapsed_seconds(marker.started_at, now),
            "resumed running timer"
        );
        self.state = TimerState::Running(active);
        Ok(true)
    }

    /// Advance the live duration if a tick is due. Returns whether it ticked.
    pub fn tick(&mut self, now: DateTime<Local>) -> bool {
        let TimerState::Running(active) = &mut self.state else {
            return false;
        };
        if !active.ticker.poll(now) {
            return false;
        }
        active.session.tick(now);
        true
    }

    /// Recompute the live duration regardless of the ticker
    pub fn refresh(&mut self, now: DateTime<Local>) {
        if let TimerState::Running(active) = &mut self.state {
            active.session.tick(now);
        }
    }

    /// Time until the next tick, `None` when idle
    pub fn until_next_tick(&self, now: DateTime<Local>) -> Option<Duration> {
        match &self.state {
            TimerState::Running(active) => Some(active.ticker.until_next(now)),
            TimerState::Idle => None,
        }
    }
}
