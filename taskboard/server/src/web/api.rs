use std::sync::Arc;

use crate::task::TaskState;

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod v1 {
    use crate::task::TaskServiceError;
    use crate::task::rules::FieldError;
    use axum::{
        Json,
        extract::rejection::JsonRejection,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const STORE_ERROR: &str = "STORE_ERROR";

    /// JSON response for API errors
    #[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
    pub struct ErrorResponse {
        /// Machine-readable error code
        pub error: String,
        /// Human-readable message
        pub message: String,
        /// Field-level failures, for validation errors only
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub details: Option<Vec<FieldError>>,
    }

    /// An error response: status code plus JSON body.
    #[derive(Debug, Clone)]
    pub struct ApiError {
        status: StatusCode,
        body: ErrorResponse,
    }

    impl ApiError {
        pub fn new(status: StatusCode, error: &str, message: impl Into<String>) -> Self {
            Self {
                status,
                body: ErrorResponse {
                    error: error.to_string(),
                    message: message.into(),
                    details: None,
                },
            }
        }

        /// 400 with the failing fields attached.
        pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
            let mut error = Self::new(StatusCode::BAD_REQUEST, VALIDATION_ERROR, message);
            error.body.details = Some(details);
            error
        }

        pub fn not_found(message: impl Into<String>) -> Self {
            Self::new(StatusCode::NOT_FOUND, NOT_FOUND, message)
        }

        /// 500 with a generic message. The cause is logged by the caller, never sent.
        pub fn store_error() -> Self {
            Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                STORE_ERROR,
                "The task store is unavailable. Please try again later.",
            )
        }

        pub fn status(&self) -> StatusCode {
            self.status
        }

        pub fn body(&self) -> &ErrorResponse {
            &self.body
        }
    }

    impl From<TaskServiceError> for ApiError {
        fn from(err: TaskServiceError) -> Self {
            match err {
                TaskServiceError::Validation(validation) => {
                    let message = validation.to_string();
                    ApiError::validation(message, validation.into_errors())
                }
                TaskServiceError::TaskNotFound(id) => {
                    tracing::warn!("Task with ID {} not found", id);
                    ApiError::not_found(format!("Task with ID {id} not found"))
                }
                TaskServiceError::Database(db_err) => {
                    tracing::error!("Task store failure: {}", db_err);
                    ApiError::store_error()
                }
            }
        }
    }

    /// Malformed, mistyped or unexpected request bodies are validation failures.
    impl From<JsonRejection> for ApiError {
        fn from(rejection: JsonRejection) -> Self {
            ApiError::validation(rejection.body_text(), Vec::new())
        }
    }

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            (self.status, Json(self.body)).into_response()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::task::rules::ValidationError;
        use uuid::Uuid;

        async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
            let response = error.into_response();
            let status = response.status();
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, serde_json::from_slice(&body).unwrap())
        }

        #[tokio::test]
        async fn can_map_validation_error_to_bad_request() {
            let err = TaskServiceError::Validation(ValidationError::new(vec![FieldError::new(
                "name",
                "name is required",
            )]));

            let (status, body) = body_of(ApiError::from(err)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "VALIDATION_ERROR");
            assert_eq!(body["details"][0]["field"], "name");
        }

        #[tokio::test]
        async fn can_map_missing_task_to_not_found() {
            let id = Uuid::new_v4();
            let (status, body) = body_of(ApiError::from(TaskServiceError::TaskNotFound(id))).await;

            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"], "NOT_FOUND");
            assert_eq!(body["message"], format!("Task with ID {id} not found"));
            assert!(body.get("details").is_none());
        }

        #[tokio::test]
        async fn does_not_leak_store_error_details() {
            let err = TaskServiceError::Database(sea_orm::DbErr::Custom(
                "password authentication failed".to_string(),
            ));

            let (status, body) = body_of(ApiError::from(err)).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"], "STORE_ERROR");
            assert!(!body["message"].as_str().unwrap().contains("password"));
        }
    }
}

/// OpenAPI description of the task API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::api::v1::list_tasks_handler,
        crate::task::api::v1::get_task_handler,
        crate::task::api::v1::create_task_handler,
        crate::task::api::v1::update_task_handler,
        crate::task::api::v1::delete_task_handler,
    ),
    components(schemas(
        crate::task::api::v1::TaskJson,
        crate::task::api::v1::TasksResponse,
        crate::task::api::v1::DeleteTaskResponse,
        crate::task::rules::NewTask,
        crate::task::rules::TaskPatch,
        crate::task::rules::FieldError,
        crate::entities::sea_orm_active_enums::TaskStatus,
        v1::ErrorResponse,
    )),
    tags((name = "Tasks", description = "Task lifecycle operations"))
)]
pub struct ApiDoc;

/// Creates the routes for the JSON API and its documentation.
pub fn create_api_router(task_state: Arc<TaskState>) -> Router {
    let tasks_router = crate::task::api::v1::create_api_router(task_state);
    Router::new()
        .merge(tasks_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
