use crate::domain::Task;
use crate::engine::StartOutcome;
use crate::persistence::KeyValueStore;
use crate::tracker::Tracker;
use anyhow::Result;

/// View state for the live terminal UI
pub struct App<S: KeyValueStore> {
    pub tracker: Tracker<S>,
    pub selected_index: usize,
    /// Category the task list is narrowed to, if any
    pub category_filter: Option<String>,
    pub status_message: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(tracker: Tracker<S>) -> Self {
        let mut app = Self {
            tracker,
            selected_index: 0,
            category_filter: None,
            status_message: None,
        };
        app.select_active_task();
        app
    }

    /// Tasks shown in the list, in store order
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tracker.tasks_filtered("", self.category_filter.as_deref())
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.selected_index).copied()
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.visible_tasks().len() {
            self.selected_index += 1;
        }
    }

    /// Point the selection at the running task when it is visible
    fn select_active_task(&mut self) {
        let Some(active_id) = self.tracker.active_task().map(|t| t.id.clone()) else {
            return;
        };
        if let Some(idx) = self.visible_tasks().iter().position(|t| t.id == active_id) {
            self.selected_index = idx;
        }
    }

    /// Cycle the list filter through all categories and back to none
    pub fn cycle_category_filter(&mut self) {
        let names: Vec<String> = self.tracker.categories().iter().map(|c| c.name.clone()).collect();
        self.category_filter = match &self.category_filter {
            None => names.first().cloned(),
            Some(current) => {
                let next = names.iter().position(|n| n == current).map(|i| i + 1);
                next.and_then(|i| names.get(i).cloned())
            }
        };
        self.selected_index = 0;
        self.select_active_task();
    }

    /// Start the selected task, or stop it if it is the one running
    pub fn toggle_selected(&mut self) -> Result<()> {
        let Some(task_id) = self.selected_task().map(|t| t.id.clone()) else {
            return Ok(());
        };

        if self.tracker.active_task().map(|t| t.id == task_id).unwrap_or(false) {
            return self.stop();
        }

        match self.tracker.start_timer(&task_id)? {
            StartOutcome::Started { .. } => {
                let name = self.tracker.active_task().map(|t| t.name.clone()).unwrap_or_default();
                self.status_message = Some(format!("Tracking time for \"{}\"", name));
            }
            StartOutcome::AlreadyRunning => {}
            StartOutcome::UnknownTask => {
                self.status_message = Some("Task no longer exists".to_string());
            }
        }
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if let Some(stopped) = self.tracker.stop_timer()? {
            let name = self
                .tracker
                .get_task_by_id(&stopped.task_id)
                .map(|t| t.name.clone())
                .unwrap_or_default();
            self.status_message = Some(format!(
                "Recorded {} for \"{}\"",
                crate::domain::format_time(stopped.session.duration),
                name
            ));
        }
        Ok(())
    }

    /// Advance the live timer; true when the screen needs redrawing
    pub fn tick(&mut self) -> bool {
        self.tracker.tick()
    }
}
