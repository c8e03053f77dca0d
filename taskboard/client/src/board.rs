use crate::api::{ClientError, TaskApi};
use crate::cache::{CacheAction, TaskCache};
use crate::task::{NewTask, Task, TaskId, TaskPatch};

/// Asks the user to approve an irreversible operation.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined; nothing was sent.
    Cancelled,
}

/// Keeps a [`TaskCache`] in step with the server.
///
/// Every operation awaits the server before touching the cache, and applies
/// the server's record rather than the submitted one. A failed call leaves
/// the cache exactly as it was. Dropping an operation's future before it
/// completes also leaves the cache untouched.
pub struct TaskBoard<A> {
    api: A,
    cache: TaskCache,
}

impl<A: TaskApi> TaskBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: TaskCache::new(),
        }
    }

    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    /// Fetches the full list and replaces the cached collection.
    #[tracing::instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&[Task], ClientError> {
        let tasks = self.api.list().await.inspect_err(|err| {
            tracing::warn!("Failed to load tasks: {}", err);
        })?;
        self.cache.apply(CacheAction::Loaded(tasks));
        Ok(self.cache.tasks().unwrap_or_default())
    }

    /// Creates a task and adds the server's record to the front of the cache.
    #[tracing::instrument(skip(self))]
    pub async fn create(&mut self, task: NewTask) -> Result<Task, ClientError> {
        let created = self.api.create(&task).await.inspect_err(|err| {
            tracing::warn!("Failed to create task: {}", err);
        })?;
        self.cache.apply(CacheAction::Created(created.clone()));
        Ok(created)
    }

    /// Updates a task and replaces the cached copy with the server's record.
    #[tracing::instrument(skip(self))]
    pub async fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task, ClientError> {
        let updated = self.api.update(id, &patch).await.inspect_err(|err| {
            tracing::warn!("Failed to update task {}: {}", id, err);
        })?;
        self.cache.apply(CacheAction::Updated(updated.clone()));
        Ok(updated)
    }

    /// Deletes a task after the user confirms.
    ///
    /// The cached entry is removed only once the server confirms the delete.
    #[tracing::instrument(skip(self, confirm))]
    pub async fn delete(
        &mut self,
        id: TaskId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, ClientError> {
        let prompt = match self.cache.get(id) {
            Some(task) => format!("Delete task \"{}\"?", task.name),
            None => format!("Delete task {id}?"),
        };
        if !confirm.confirm(&prompt) {
            return Ok(DeleteOutcome::Cancelled);
        }

        self.api.delete(id).await.inspect_err(|err| {
            tracing::warn!("Failed to delete task {}: {}", id, err);
        })?;
        self.cache.apply(CacheAction::Deleted(id));
        Ok(DeleteOutcome::Deleted)
    }
}
