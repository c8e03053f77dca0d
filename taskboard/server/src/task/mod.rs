use crate::entities::sea_orm_active_enums::TaskStatus;
use crate::entities::*;
use chrono::{DateTime, Utc};
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

pub mod api;
pub mod rules;

use rules::{NewTask, TaskPatch, ValidationError};

/// Opaque identifier assigned to a task when it is stored.
pub type TaskId = Uuid;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: TaskId,
    name: String,
    text: Option<String>,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        id: TaskId,
        name: String,
        text: Option<String>,
        status: TaskStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            text,
            status,
            created_at,
            updated_at,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id,
            model.name,
            model.text,
            model.status,
            model.created_at,
            model.updated_at,
        )
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// The proposed creation or update breaks a field rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No task with this ID exists.
    #[error("Task with ID {0} not found")]
    TaskNotFound(TaskId),
    /// The store could not be read or written.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Shared state for the task routes.
#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// CRUD operations over the task table. The service is the only writer.
pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Retrieves all tasks in creation order.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .order_by_asc(task::Column::CreatedAt)
            .order_by_asc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        Ok(Task::from(self.find_model(id).await?))
    }

    /// Validates and stores a new task.
    ///
    /// # Arguments
    ///
    /// * `input` - The candidate record. Nothing is written if it is invalid.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `Task`, with its generated ID and timestamps.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, input: NewTask) -> Result<Task, TaskServiceError> {
        let valid = rules::validate_for_create(input)?;
        let now = rules::creation_timestamp(Utc::now());

        let active_model = task::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(valid.name),
            text: ActiveValue::Set(valid.text),
            status: ActiveValue::Set(valid.status),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::info!(task_id = %created_model.id, "Created task");
        Ok(Task::from(created_model))
    }

    /// Applies a partial update to a task and refreshes its `updated_at`.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to edit.
    /// * `patch` - The fields to replace.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task`, or `TaskNotFound` if no task has this ID.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_by_id(
        &self,
        id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task, TaskServiceError> {
        let existing = self.find_model(id).await?;
        let valid = rules::validate_for_update(&Task::from(existing.clone()), patch)?;
        let updated_at = rules::refreshed_timestamp(existing.updated_at, Utc::now());

        let mut active_model: task::ActiveModel = existing.into();
        active_model.name = ActiveValue::Set(valid.name);
        active_model.text = ActiveValue::Set(valid.text);
        active_model.status = ActiveValue::Set(valid.status);
        active_model.updated_at = ActiveValue::Set(updated_at);

        // The row may have been deleted since it was read
        let updated_model = active_model
            .update(self.db)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => TaskServiceError::TaskNotFound(id),
                other => TaskServiceError::Database(other),
            })?;
        Ok(Task::from(updated_model))
    }

    /// Permanently deletes a task.
    ///
    /// # Returns
    ///
    /// `TaskNotFound` if the store deleted nothing.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: TaskId) -> Result<(), TaskServiceError> {
        let result = task::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(TaskServiceError::TaskNotFound(id));
        }
        tracing::info!(task_id = %id, "Deleted task");
        Ok(())
    }

    async fn find_model(&self, id: TaskId) -> Result<task::Model, TaskServiceError> {
        task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }
}
