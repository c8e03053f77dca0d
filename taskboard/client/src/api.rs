use crate::task::{NewTask, Task, TaskId, TaskPatch};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Errors surfaced to the user by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with an error response.
    #[error("{message} ({code}, HTTP {status})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// The request never produced a usable response.
    #[error("Could not reach the task server: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Whether the server reported that the task does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }
}

/// The four task operations the server exposes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, ClientError>;
    async fn create(&self, task: &NewTask) -> Result<Task, ClientError>;
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ClientError>;
    async fn delete(&self, id: TaskId) -> Result<(), ClientError>;
}

#[derive(Deserialize)]
struct TaskList {
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

/// [`TaskApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskApi {
    /// Creates a client for the server at `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_else(|_| ErrorBody {
            error: "UNKNOWN".to_string(),
            message: status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string(),
        });
        Err(ClientError::Api {
            status: status.as_u16(),
            code: body.error,
            message: body.message,
        })
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        let response = self.client.get(self.url("/tasks")).send().await?;
        let list: TaskList = Self::decode(response).await?;
        Ok(list.tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn create(&self, task: &NewTask) -> Result<Task, ClientError> {
        let response = self.client.post(self.url("/tasks")).json(task).send().await?;
        Self::decode(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ClientError> {
        let response = self
            .client
            .patch(self.url(&format!("/tasks/{id}")))
            .json(patch)
            .send()
            .await?;
        Self::decode(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: TaskId) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/tasks/{id}")))
            .send()
            .await?;
        let _confirmation: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }
}
