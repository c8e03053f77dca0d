//! The client's local copy of the task list.
//!
//! The cache is never the source of truth. It changes only through
//! [`TaskCache::apply`], and callers only apply actions built from
//! server-confirmed records.

use crate::task::{Task, TaskId};

/// Whether the initial fetch has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
}

/// Transitions of the cached collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheAction {
    /// Replace the whole collection with a fresh server list.
    Loaded(Vec<Task>),
    /// A task the server just created; placed first.
    Created(Task),
    /// The server's copy of an updated task; replaces the entry with the same id.
    Updated(Task),
    /// A task the server deleted.
    Deleted(TaskId),
}

#[derive(Debug, Clone)]
pub struct TaskCache {
    state: LoadState,
    tasks: Vec<Task>,
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskCache {
    /// An empty cache waiting for its initial load.
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            tasks: Vec::new(),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// The cached tasks, or `None` while the initial load is outstanding.
    ///
    /// A loading cache has no list to show; it is not the same as an empty one.
    pub fn tasks(&self) -> Option<&[Task]> {
        match self.state {
            LoadState::Loading => None,
            LoadState::Ready => Some(&self.tasks),
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn apply(&mut self, action: CacheAction) {
        match action {
            CacheAction::Loaded(tasks) => {
                self.tasks = tasks;
                self.state = LoadState::Ready;
            }
            CacheAction::Created(task) => {
                // A repeated confirmation must not duplicate the entry
                self.tasks.retain(|existing| existing.id != task.id);
                self.tasks.insert(0, task);
            }
            CacheAction::Updated(task) => {
                if let Some(existing) = self.tasks.iter_mut().find(|existing| existing.id == task.id) {
                    *existing = task;
                }
            }
            CacheAction::Deleted(id) => {
                self.tasks.retain(|task| task.id != id);
            }
        }
    }
}
