use crate::entities::sea_orm_active_enums::TaskStatus;
use crate::task::rules::{NewTask, TaskPatch};
use crate::task::{Task, TaskId, TaskService, TaskState};
use crate::web::api::v1::ApiError;
use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a Task for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    /// Unique identifier generated by the server
    #[schema(value_type = String, format = Uuid)]
    pub id: TaskId,
    /// Task title
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Lifecycle status
    pub status: TaskStatus,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When the task was last modified
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            name: task.name().to_string(),
            text: task.text().map(str::to_string),
            status: task.status(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// API response for listing all tasks.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TasksResponse {
    /// All tasks, oldest first
    pub tasks: Vec<TaskJson>,
    /// Total number of tasks
    pub count: usize,
}

/// Confirmation returned after a task is deleted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteTaskResponse {
    /// ID of the deleted task
    #[schema(value_type = String, format = Uuid)]
    pub id: TaskId,
    pub message: String,
}

/// Ids that are not UUIDs cannot name a stored task.
fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    TaskId::parse_str(raw).map_err(|_| ApiError::not_found(format!("Task with ID {raw} not found")))
}

/// Handler for GET /tasks - Returns all tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = TasksResponse),
        (status = 500, description = "Store error", body = crate::web::api::v1::ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
) -> Result<Json<TasksResponse>, ApiError> {
    let service = TaskService::new(&state.db);
    let tasks: Vec<TaskJson> = service
        .list_tasks()
        .await?
        .into_iter()
        .map(TaskJson::from)
        .collect();
    let count = tasks.len();
    Ok(Json(TasksResponse { tasks, count }))
}

/// Handler for GET /tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task ID (UUID)")),
    responses(
        (status = 200, description = "Task found", body = TaskJson),
        (status = 404, description = "Unknown task ID", body = crate::web::api::v1::ErrorResponse),
        (status = 500, description = "Store error", body = crate::web::api::v1::ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskJson>, ApiError> {
    let id = parse_task_id(&id)?;
    let service = TaskService::new(&state.db);
    let task = service.get_task_by_id(id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for POST /tasks - Creates a task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created", body = TaskJson),
        (status = 400, description = "Invalid input", body = crate::web::api::v1::ErrorResponse),
        (status = 500, description = "Store error", body = crate::web::api::v1::ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), ApiError> {
    let Json(input) = payload?;
    let service = TaskService::new(&state.db);
    let task = service.create_task(input).await?;
    Ok((StatusCode::CREATED, Json(TaskJson::from(task))))
}

/// Handler for PATCH /tasks/{id} - Applies a partial update.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    patch,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task ID (UUID)")),
    request_body = TaskPatch,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 400, description = "Invalid input", body = crate::web::api::v1::ErrorResponse),
        (status = 404, description = "Unknown task ID", body = crate::web::api::v1::ErrorResponse),
        (status = 500, description = "Store error", body = crate::web::api::v1::ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let id = parse_task_id(&id)?;
    let Json(patch) = payload?;
    let service = TaskService::new(&state.db);
    let task = service.update_task_by_id(id, patch).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for DELETE /tasks/{id} - Permanently removes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task ID (UUID)")),
    responses(
        (status = 200, description = "Task deleted", body = DeleteTaskResponse),
        (status = 404, description = "Unknown task ID", body = crate::web::api::v1::ErrorResponse),
        (status = 500, description = "Store error", body = crate::web::api::v1::ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteTaskResponse>, ApiError> {
    let id = parse_task_id(&id)?;
    let service = TaskService::new(&state.db);
    service.delete_task_by_id(id).await?;
    Ok(Json(DeleteTaskResponse {
        id,
        message: "Task deleted".to_string(),
    }))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .patch(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
