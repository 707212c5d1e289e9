//! # Todolists
//!
//! Client-side state layer for todolists and their tasks, kept in sync with a
//! REST backend.
//!
//! State lives in one [`RootState`] driven by [`TodolistsReducer`]:
//!
//! - [`todolists::TodolistsState`]: ordered todolists with a display filter and
//!   a per-row request status
//! - [`tasks::TasksState`]: one task bucket per todolist
//! - [`app::AppStatusState`]: global request status and last error
//!
//! A command (say, [`TodolistsAction::AddTodolist`]) marks the request as
//! loading and returns an effect calling the backend. The effect resolves to a
//! fulfilled event, applied to both slices in the same reducer call, or to
//! [`TodolistsAction::Rejected`], which reports the error and leaves the domain
//! state untouched. Task buckets always match the todolists one to one.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use todolists::{ApiConfig, InMemoryTodolistsApi, TodolistsClient, TodolistsEnvironment};
//!
//! # async fn demo() -> Result<(), todolists::SyncError> {
//! let environment = TodolistsEnvironment::new(Arc::new(InMemoryTodolistsApi::new()));
//! let client = TodolistsClient::init(environment, &ApiConfig::default());
//!
//! let groceries = client.add_todolist("Groceries").await?;
//! assert_eq!(client.tasks(&groceries.id).await, Some(Vec::new()));
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod reducer;
pub mod tasks;
pub mod todolists;
pub mod types;

pub use action::{Operation, TodolistsAction};
pub use api::{HttpTodolistsApi, InMemoryTodolistsApi, TodolistsApi};
pub use client::{TodolistsClient, TodolistsStore};
pub use config::ApiConfig;
pub use error::{ApiError, ConfigError, SyncError};
pub use reducer::{RootState, TodolistsEnvironment, TodolistsReducer};
pub use types::{
    AddTaskArgs, FilterValue, RequestId, RequestStatus, Task, TaskId, TaskModel, TaskPatch,
    TaskPriority, TaskStatus, Todolist, TodolistId,
};
