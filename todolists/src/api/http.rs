//! HTTP implementation of [`TodolistsApi`]

use super::{GetTasksResponse, ItemData, ResponseEnvelope, TitleBody, TodolistsApi};
use crate::config::ApiConfig;
use crate::error::{ApiError, ConfigError};
use crate::types::{AddTaskArgs, Task, TaskId, TaskModel, Todolist, TodolistId};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "API-KEY";

/// Todolists backend over HTTP
///
/// Keeps a cookie store so session cookies set by the backend are sent back
/// on later requests.
#[derive(Clone, Debug)]
pub struct HttpTodolistsApi {
    client: Client,
    base_url: Url,
}

impl HttpTodolistsApi {
    /// Creates a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base URL or API key cannot be used, or
    /// the underlying HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "TODOLISTS_API_URL",
            value: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(key).map_err(|e| ConfigError::InvalidValue {
                key: "TODOLISTS_API_KEY",
                value: "<redacted>".to_string(),
                reason: e.to_string(),
            })?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Base URL every endpoint is resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid endpoint {path}: {e}")))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "Backend answered with an error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TodolistsApi for HttpTodolistsApi {
    async fn get_todolists(&self) -> Result<Vec<Todolist>, ApiError> {
        let url = self.url("todo-lists")?;
        self.execute(self.client.get(url)).await
    }

    async fn create_todolist(
        &self,
        title: &str,
    ) -> Result<ResponseEnvelope<ItemData<Todolist>>, ApiError> {
        let url = self.url("todo-lists")?;
        let body = TitleBody {
            title: title.to_string(),
        };
        self.execute(self.client.post(url).json(&body)).await
    }

    async fn delete_todolist(&self, id: &TodolistId) -> Result<ResponseEnvelope, ApiError> {
        let url = self.url(&format!("todo-lists/{id}"))?;
        self.execute(self.client.delete(url)).await
    }

    async fn update_todolist(
        &self,
        id: &TodolistId,
        title: &str,
    ) -> Result<ResponseEnvelope, ApiError> {
        let url = self.url(&format!("todo-lists/{id}"))?;
        let body = TitleBody {
            title: title.to_string(),
        };
        self.execute(self.client.put(url).json(&body)).await
    }

    async fn get_tasks(&self, todolist_id: &TodolistId) -> Result<GetTasksResponse, ApiError> {
        let url = self.url(&format!("todo-lists/{todolist_id}/tasks"))?;
        self.execute(self.client.get(url)).await
    }

    async fn create_task(
        &self,
        args: &AddTaskArgs,
    ) -> Result<ResponseEnvelope<ItemData<Task>>, ApiError> {
        let url = self.url(&format!("todo-lists/{}/tasks", args.todolist_id))?;
        let body = TitleBody {
            title: args.title.clone(),
        };
        self.execute(self.client.post(url).json(&body)).await
    }

    async fn delete_task(
        &self,
        todolist_id: &TodolistId,
        task_id: &TaskId,
    ) -> Result<ResponseEnvelope, ApiError> {
        let url = self.url(&format!("todo-lists/{todolist_id}/tasks/{task_id}"))?;
        self.execute(self.client.delete(url)).await
    }

    async fn update_task(
        &self,
        todolist_id: &TodolistId,
        task_id: &TaskId,
        model: &TaskModel,
    ) -> Result<ResponseEnvelope, ApiError> {
        let url = self.url(&format!("todo-lists/{todolist_id}/tasks/{task_id}"))?;
        self.execute(self.client.put(url).json(model)).await
    }
}
