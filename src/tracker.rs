use crate::clock::{Clock, SystemClock};
use crate::domain::{Category, Task, TaskUpdate, TimeSession};
use crate::engine::{StartOutcome, StoppedSession, TimerEngine};
use crate::error::StorageError;
use crate::persistence::KeyValueStore;
use crate::stats::{self, CategoryTotal, WeekStart};
use crate::store::TaskStore;
use crate::ticker::tick_duration;
use chrono::Duration;

/// Tunables that do not change during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOptions {
    pub week_start: WeekStart,
    pub tick_interval: Duration,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            tick_interval: tick_duration(),
        }
    }
}

/// Owns the task store, the timer engine and the clock
pub struct Tracker<S: KeyValueStore> {
    store: TaskStore<S>,
    engine: TimerEngine,
    clock: Box<dyn Clock>,
    options: TrackerOptions,
}

impl<S: KeyValueStore> Tracker<S> {
    /// Load state from `storage` using the system clock, resuming any running timer
    pub fn open(storage: S, options: TrackerOptions) -> Result<Self, StorageError> {
        Self::open_with_clock(storage, options, Box::new(SystemClock))
    }

    pub fn open_with_clock(storage: S, options: TrackerOptions, clock: Box<dyn Clock>) -> Result<Self, StorageError> {
        let mut store = TaskStore::load(storage)?;
        let mut engine = TimerEngine::new(options.tick_interval);
        engine.resume(&mut store, clock.now())?;

        Ok(Self {
            store,
            engine,
            clock,
            options,
        })
    }

    pub fn into_storage(self) -> S {
        self.store.into_storage()
    }

    pub fn options(&self) -> &TrackerOptions {
        &self.options
    }

    // ---- tasks ----

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn get_task_by_id(&self, id: &str) -> Option<&Task> {
        self.store.get_task(id)
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve_task_id(&self, id_or_prefix: &str) -> Option<&str> {
        if let Some(task) = self.store.get_task(id_or_prefix) {
            return Some(&task.id);
        }
        if id_or_prefix.is_empty() {
            return None;
        }
        let mut matches = self.store.tasks().iter().filter(|t| t.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Some(&task.id),
            _ => None,
        }
    }

    /// Tasks whose name or description contains `search` (case-insensitive) and,
    /// when given, whose category equals `category`
    pub fn tasks_filtered(&self, search: &str, category: Option<&str>) -> Vec<&Task> {
        let needle = search.to_lowercase();
        self.store
            .tasks()
            .iter()
            .filter(|t| {
                needle.is_empty()
                    || t.name.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect()
    }

    pub fn add_task(&mut self, name: &str, category: &str, description: &str) -> Result<Task, StorageError> {
        let now = self.clock.now();
        self.store.add_task(name, category, description, now)
    }

    /// Returns the updated task, or `None` for an unknown id
    pub fn update_task(&mut self, id: &str, update: &TaskUpdate) -> Result<Option<Task>, StorageError> {
        self.store.update_task(id, update)
    }

    /// Delete a task, force-stopping its timer first. The in-flight session is
    /// finalized and discarded along with the task.
    pub fn delete_task(&mut self, id: &str) -> Result<Option<Task>, StorageError> {
        if self.store.get_task(id).is_none() {
            return Ok(None);
        }
        if self.engine.active_task_id() == Some(id) {
            let now = self.clock.now();
            self.engine.abandon(&mut self.store, now)?;
        }
        self.store.remove_task(id)
    }

    // ---- timer ----

    pub fn start_timer(&mut self, task_id: &str) -> Result<StartOutcome, StorageError> {
        let now = self.clock.now();
        self.engine.start(&mut self.store, task_id, now)
    }

    pub fn stop_timer(&mut self) -> Result<Option<StoppedSession>, StorageError> {
        let now = self.clock.now();
        self.engine.stop(&mut self.store, now)
    }

    /// Drive the live duration; call from the event loop
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        self.engine.tick(now)
    }

    /// Bring the live duration up to date right now
    pub fn refresh(&mut self) {
        let now = self.clock.now();
        self.engine.refresh(now);
    }

    pub fn until_next_tick(&self) -> Option<Duration> {
        self.engine.until_next_tick(self.clock.now())
    }

    pub fn is_timer_running(&self) -> bool {
        self.engine.is_running()
    }

    /// The task that owns the in-flight session
    pub fn active_task(&self) -> Option<&Task> {
        self.engine.active_task_id().and_then(|id| self.store.get_task(id))
    }

    pub fn current_session(&self) -> Option<&TimeSession> {
        self.engine.current_session()
    }

    // ---- categories ----

    pub fn categories(&self) -> &[Category] {
        self.store.categories()
    }

    pub fn find_category(&self, name: &str) -> Option<&Category> {
        self.store.find_category(name)
    }

    pub fn add_category(&mut self, name: &str, color: &str) -> Result<Category, StorageError> {
        self.store.add_category(name, color)
    }

    // ---- aggregates ----

    pub fn total_time_by_category(&self) -> Vec<CategoryTotal> {
        stats::total_time_by_category(self.store.tasks())
    }

    pub fn most_active_task(&self) -> Option<&Task> {
        stats::most_active_task(self.store.tasks())
    }

    pub fn most_active_category(&self) -> Option<CategoryTotal> {
        stats::most_active_category(self.store.tasks())
    }

    pub fn weekly_total(&self) -> u64 {
        stats::weekly_total(self.store.tasks(), self.clock.now(), self.options.week_start)
    }

    pub fn monthly_total(&self) -> u64 {
        stats::monthly_total(self.store.tasks(), self.clock.now())
    }

    pub fn day_of_week_totals(&self) -> [u64; 7] {
        stats::day_of_week_totals(self.store.tasks())
    }
}
