use crate::domain::{Category, Task, TaskUpdate, TimeSession};
use crate::error::StorageError;
use crate::persistence::{encode, load_categories, load_tasks, KeyValueStore, StorageKey};
use chrono::{DateTime, Local};

/// Task and category collections. Every mutation writes the affected collection
/// back to storage before returning.
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    tasks: Vec<Task>,
    categories: Vec<Category>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load both collections from `storage`, degrading malformed payloads to defaults
    pub fn load(mut storage: S) -> Result<Self, StorageError> {
        let tasks = load_tasks(&mut storage)?;
        let categories = load_categories(&mut storage)?;
        tracing::debug!(tasks = tasks.len(), categories = categories.len(), "loaded store");

        Ok(Self {
            storage,
            tasks,
            categories,
        })
    }

    /// Tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Categories in insertion order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.matches(name))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Create a task with no sessions and append it
    pub fn add_task(
        &mut self,
        name: &str,
        category: &str,
        description: &str,
        now: DateTime<Local>,
    ) -> Result<Task, StorageError> {
        let task = Task::new(name.to_string(), category.to_string(), description.to_string(), now);
        self.tasks.push(task.clone());
        self.persist_tasks()?;

        tracing::info!(task = %task.id, name = %task.name, "task created");
        Ok(task)
    }

    /// Merge editable fields into a task. Returns `None` if the id is unknown.
    pub fn update_task(&mut self, id: &str, update: &TaskUpdate) -> Result<Option<Task>, StorageError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.apply(update);
        let updated = task.clone();
        self.persist_tasks()?;

        tracing::info!(task = %id, "task updated");
        Ok(Some(updated))
    }

    /// Remove a task. Callers must stop any session running on it first.
    pub(crate) fn remove_task(&mut self, id: &str) -> Result<Option<Task>, StorageError> {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let removed = self.tasks.remove(index);
        self.persist_tasks()?;

        tracing::info!(task = %id, name = %removed.name, "task deleted");
        Ok(Some(removed))
    }

    /// Append a finalized session to its task. Returns false if the task is gone.
    /// On a failed write the task is left as it was.
    pub(crate) fn commit_session(&mut self, task_id: &str, session: TimeSession) -> Result<bool, StorageError> {
        let Some(index) = self.tasks.iter().position(|t| t.id == task_id) else {
            return Ok(false);
        };
        let mut task = self.tasks[index].clone();
        if !task.commit_session(session) {
            return Ok(false);
        }

        let previous = std::mem::replace(&mut self.tasks[index], task);
        if let Err(e) = self.persist_tasks() {
            self.tasks[index] = previous;
            return Err(e);
        }
        Ok(true)
    }

    /// Append a category; the name is lowercased. Uniqueness is checked by callers.
    pub fn add_category(&mut self, name: &str, color: &str) -> Result<Category, StorageError> {
        let category = Category::new(name, color);
        self.categories.push(category.clone());
        self.persist_categories()?;

        tracing::info!(category = %category.name, color = %category.color, "category added");
        Ok(category)
    }

    fn persist_tasks(&mut self) -> Result<(), StorageError> {
        let payload = encode(StorageKey::Tasks, &self.tasks)?;
        self.storage.set(StorageKey::Tasks, &payload)
    }

    fn persist_categories(&mut self) -> Result<(), StorageError> {
        let payload = encode(StorageKey::Categories, &self.categories)?;
        self.storage.set(StorageKey::Categories, &payload)
    }
}
