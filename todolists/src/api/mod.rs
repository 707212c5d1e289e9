//! REST collaborator: the backend contract and its implementations
//!
//! - [`HttpTodolistsApi`]: the real backend over HTTP
//! - [`InMemoryTodolistsApi`]: an in-process backend for tests and offline demos

use crate::error::{ApiError, SyncError};
use crate::types::{AddTaskArgs, Task, TaskId, TaskModel, Todolist, TodolistId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod http;
pub mod in_memory;

pub use http::HttpTodolistsApi;
pub use in_memory::{ApiCall, InMemoryTodolistsApi, ScriptedFailure};

/// Result code of an accepted request
pub const RESULT_CODE_SUCCESS: i32 = 0;

/// Result code of a request the server refused
pub const RESULT_CODE_REJECTED: i32 = 1;

/// Empty `data` payload
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyData {}

/// `data` payload wrapping a single created record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData<T> {
    /// The record; absent when the server refused the request
    #[serde(default = "Option::default")]
    pub item: Option<T>,
}

impl<T> ItemData<T> {
    /// Wraps a record
    pub const fn new(item: T) -> Self {
        Self { item: Some(item) }
    }
}

impl<T> Default for ItemData<T> {
    fn default() -> Self {
        Self { item: None }
    }
}

/// Response shape shared by every mutating endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "D: Deserialize<'de> + Default"))]
pub struct ResponseEnvelope<D = EmptyData> {
    /// `0` on success
    pub result_code: i32,
    /// Human-readable messages, usually explaining a refusal
    #[serde(default)]
    pub messages: Vec<String>,
    /// Payload
    #[serde(default)]
    pub data: D,
}

impl<D> ResponseEnvelope<D> {
    /// Accepted response carrying `data`
    pub const fn success(data: D) -> Self {
        Self {
            result_code: RESULT_CODE_SUCCESS,
            messages: Vec::new(),
            data,
        }
    }

    /// Refused response with the given messages
    pub fn rejected(messages: Vec<String>) -> Self
    where
        D: Default,
    {
        Self {
            result_code: RESULT_CODE_REJECTED,
            messages,
            data: D::default(),
        }
    }

    /// Whether the server accepted the request
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result_code == RESULT_CODE_SUCCESS
    }

    /// Payload of an accepted response
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Server`] with the first message when the result
    /// code is non-zero.
    pub fn into_result(self) -> Result<D, SyncError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(SyncError::from_messages(&self.messages))
        }
    }
}

impl<D: Default> Default for ResponseEnvelope<D> {
    fn default() -> Self {
        Self::success(D::default())
    }
}

/// Response of the task listing endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTasksResponse {
    /// Tasks of the todolist
    #[serde(default)]
    pub items: Vec<Task>,
    /// Total number of tasks on the server
    #[serde(default)]
    pub total_count: u32,
    /// Application-level error
    #[serde(default)]
    pub error: Option<String>,
}

impl GetTasksResponse {
    /// Tasks of a successful listing
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Server`] when the response carries an error.
    pub fn into_result(self) -> Result<Vec<Task>, SyncError> {
        match self.error {
            Some(error) => Err(SyncError::from_messages(&[error])),
            None => Ok(self.items),
        }
    }
}

/// Todolist title payload for create and rename
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleBody {
    /// Title
    pub title: String,
}

/// The remote todolists backend
///
/// Implementations report transport-level problems as [`ApiError`]; a refusal
/// by the server is an `Ok` response with a non-zero result code.
#[async_trait]
pub trait TodolistsApi: Send + Sync {
    /// Lists every todolist
    async fn get_todolists(&self) -> Result<Vec<Todolist>, ApiError>;

    /// Creates a todolist
    async fn create_todolist(
        &self,
        title: &str,
    ) -> Result<ResponseEnvelope<ItemData<Todolist>>, ApiError>;

    /// Deletes a todolist and its tasks
    async fn delete_todolist(&self, id: &TodolistId) -> Result<ResponseEnvelope, ApiError>;

    /// Renames a todolist
    async fn update_todolist(
        &self,
        id: &TodolistId,
        title: &str,
    ) -> Result<ResponseEnvelope, ApiError>;

    /// Lists the tasks of a todolist
    async fn get_tasks(&self, todolist_id: &TodolistId) -> Result<GetTasksResponse, ApiError>;

    /// Creates a task
    async fn create_task(
        &self,
        args: &AddTaskArgs,
    ) -> Result<ResponseEnvelope<ItemData<Task>>, ApiError>;

    /// Deletes a task
    async fn delete_task(
        &self,
        todolist_id: &TodolistId,
        task_id: &TaskId,
    ) -> Result<ResponseEnvelope, ApiError>;

    /// Replaces the editable fields of a task
    async fn update_task(
        &self,
        todolist_id: &TodolistId,
        task_id: &TaskId,
        model: &TaskModel,
    ) -> Result<ResponseEnvelope, ApiError>;
}
