//! Client facade over the todolists store
//!
//! Awaited operations resolve when their request settles: `Ok` once the
//! fulfilled event has been applied to state, `Err` with the rejection
//! otherwise. Local actions resolve as soon as the reducer ran.

use crate::action::TodolistsAction;
use crate::app::AppStatusState;
use crate::config::ApiConfig;
use crate::error::SyncError;
use crate::reducer::{RootState, TodolistsEnvironment, TodolistsReducer};
use crate::todolists::TodolistEntry;
use crate::types::{
    AddTaskArgs, FilterValue, RequestId, RequestStatus, Task, TaskId, TaskPatch, Todolist,
    TodolistId,
};
use std::time::Duration;
use todolists_runtime::{Store, StoreError};
use tokio::sync::broadcast;

/// The store type behind [`TodolistsClient`]
pub type TodolistsStore = Store<RootState, TodolistsAction, TodolistsEnvironment, TodolistsReducer>;

/// Handle to the todolists state layer
///
/// Cloning is cheap; every clone drives the same store.
#[derive(Clone)]
pub struct TodolistsClient {
    store: TodolistsStore,
    operation_timeout: Duration,
}

impl TodolistsClient {
    /// Creates an empty state layer talking to the environment's backend
    #[must_use]
    pub fn init(environment: TodolistsEnvironment, config: &ApiConfig) -> Self {
        let store = Store::new(RootState::new(), TodolistsReducer::new(), environment);
        Self {
            store,
            operation_timeout: config.operation_timeout,
        }
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &TodolistsStore {
        &self.store
    }

    /// Snapshot of the whole state
    pub async fn state(&self) -> RootState {
        self.store.state(Clone::clone).await
    }

    /// Todolists in display order
    pub async fn todolists(&self) -> Vec<TodolistEntry> {
        self.store.state(|s| s.todolists.as_slice().to_vec()).await
    }

    /// Tasks of a todolist, `None` if it has no bucket
    pub async fn tasks(&self, todolist_id: &TodolistId) -> Option<Vec<Task>> {
        self.store
            .state(|s| s.tasks.bucket(todolist_id).map(<[Task]>::to_vec))
            .await
    }

    /// Tasks of a todolist shown under its current filter
    pub async fn visible_tasks(&self, todolist_id: &TodolistId) -> Vec<Task> {
        self.store
            .state(|s| {
                let filter = s
                    .todolists
                    .get(todolist_id)
                    .map_or(FilterValue::All, |entry| entry.filter);
                s.tasks
                    .visible(todolist_id, filter)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .await
    }

    /// Global request status
    pub async fn app_status(&self) -> AppStatusState {
        self.store.state(|s| s.app.clone()).await
    }

    /// Observes every action produced by effects, after it was applied
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TodolistsAction> {
        self.store.subscribe_actions()
    }

    /// Fetches every todolist and creates its empty task bucket
    ///
    /// # Errors
    ///
    /// Returns the rejection reason, [`SyncError::Timeout`] or [`SyncError::Store`].
    #[tracing::instrument(skip(self))]
    pub async fn fetch_todolists(&self) -> Result<Vec<Todolist>, SyncError> {
        let request_id = RequestId::new();
        self.request(TodolistsAction::FetchTodolists { request_id }, |outcome| {
            match outcome {
                TodolistsAction::TodolistsFetched { todolists, .. } => Some(todolists),
                _ => None,
            }
        })
        .await
    }

    /// Creates a todolist
    ///
    /// # Errors
    ///
    /// Returns the rejection reason, [`SyncError::Timeout`] or [`SyncError::Store`].
    #[tracing::instrument(skip(self, title))]
    pub async fn add_todolist(&self, title: impl Into<String>) -> Result<Todolist, SyncError> {
        let request_id = RequestId::new();
        let title = title.into();
        self.request(TodolistsAction::AddTodolist { request_id, title }, |outcome| {
            match outcome {
                TodolistsAction::TodolistAdded { todolist, .. } => Some(todolist),
                _ => None,
            }
        })
        .await
    }

    /// Deletes a todolist together with its tasks
    ///
    /// # Errors
    ///
    /// Returns the rejection reason, [`SyncError::Timeout`] or [`SyncError::Store`].
    #[tracing::instrument(skip(self))]
    pub async fn remove_todolist(&self, id: &TodolistId) -> Result<(), SyncError> {
        let request_id = RequestId::new();
        let command = TodolistsAction::RemoveTodolist {
            request_id,
            id: id.clone(),
        };
        self.request(command, |outcome| {
            matches!(outcome, TodolistsAction::TodolistRemoved { .. }).then_some(())
        })
        .await
    }

    /// Renames a todolist
    ///
    /// # Errors
    ///
    /// Returns the rejection reason, [`SyncError::Timeout`] or [`SyncError::Store`].
    #[tracing::instrument(skip(self, title))]
    pub async fn change_todolist_title(
        &self,
        id: &TodolistId,
        title: impl Into<String>,
    ) -> Result<(), SyncError> {
        let request_id = RequestId::new();
        let command = TodolistsAction::ChangeTodolistTitle {
            request_id,
            id: id.clone(),
            title: title.into(),
        };
        self.request(command, |outcome| {
            matches!(outcome, TodolistsAction::TodolistTitleChanged { .. }).then_some(())
        })
        .await
    }

    /// Fetches the tasks of a todolist
    ///
    /// # Errors
    ///
    /// Returns the rejection reason, [`SyncError::Timeout`] or [`SyncError::Store`].
    #[tracing::instrument(skip(self))]
    pub async fn fetch_tasks(&self, todolist_id: &TodolistId) -> Result<Vec<Task>, SyncError> {
        let request_id = RequestId::new();
        let command = TodolistsAction::FetchTasks {
            request_id,
            todolist_id: todolist_id.clone(),
        };
        self.request(command, |outcome| match outcome {
            TodolistsAction::TasksFetched { tasks, .. } => Some(tasks),
            _ => None,
        })
        .await
    }

    /// Creates a task
    ///
    /// # Errors
    ///
    /// Returns the rejection reason, [`SyncError::Timeout`] or [`SyncError::Store`].
    #[tracing::instrument(skip(self))]
    pub async fn add_task(&self, args: AddTaskArgs) -> Result<Task, SyncError> {
        let request_id = RequestId::new();
        self.request(TodolistsAction::AddTask { request_id, args }, |outcome| {
            match outcome {
                TodolistsAction::TaskAdded { task, .. } => Some(task),
                _ => None,
            }
        })
        .await
    }

    /// Deletes a task
    ///
    /// # Errors
    ///
    /// Returns the rejection reason, [`SyncError::Timeout`] or [`SyncError::Store`].
    #[tracing::instrument(skip(self))]
    pub async fn remove_task(
        &self,
        todolist_id: &TodolistId,
        task_id: &TaskId,
    ) -> Result<(), SyncError> {
        let request_id = RequestId::new();
        let command = TodolistsAction::RemoveTask {
            request_id,
            todolist_id: todolist_id.clone(),
            task_id: task_id.clone(),
        };
        self.request(command, |outcome| {
            matches!(outcome, TodolistsAction::TaskRemoved { .. }).then_some(())
        })
        .await
    }

    /// Updates some fields of a task
    ///
    /// The patch is merged over the task currently in memory and the full
    /// model is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::TaskNotFound`] without contacting the backend if
    /// the task is not in memory, otherwise the rejection reason,
    /// [`SyncError::Timeout`] or [`SyncError::Store`].
    #[tracing::instrument(skip(self))]
    pub async fn update_task(
        &self,
        todolist_id: &TodolistId,
        task_id: &TaskId,
        patch: TaskPatch,
    ) -> Result<(), SyncError> {
        let request_id = RequestId::new();
        let command = TodolistsAction::UpdateTask {
            request_id,
            todolist_id: todolist_id.clone(),
            task_id: task_id.clone(),
            patch,
        };
        self.request(command, |outcome| {
            matches!(outcome, TodolistsAction::TaskUpdated { .. }).then_some(())
        })
        .await
    }

    /// Changes the display filter of a todolist
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn change_filter(&self, id: &TodolistId, filter: FilterValue) -> Result<(), SyncError> {
        self.dispatch(TodolistsAction::ChangeTodolistFilter {
            id: id.clone(),
            filter,
        })
        .await
    }

    /// Overrides the request status of a todolist row
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn change_entity_status(
        &self,
        id: &TodolistId,
        status: RequestStatus,
    ) -> Result<(), SyncError> {
        self.dispatch(TodolistsAction::ChangeTodolistEntityStatus {
            id: id.clone(),
            status,
        })
        .await
    }

    /// Drops every todolist and task, e.g. on logout
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn clear(&self) -> Result<(), SyncError> {
        self.dispatch(TodolistsAction::ClearTodolistsData).await
    }

    /// Sets or dismisses the global error message
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn set_app_error(&self, error: Option<String>) -> Result<(), SyncError> {
        self.dispatch(TodolistsAction::SetAppError { error }).await
    }

    /// Stops accepting operations and waits for in-flight requests
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if requests are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }

    async fn dispatch(&self, action: TodolistsAction) -> Result<(), SyncError> {
        self.store
            .send(action)
            .await
            .map(|_| ())
            .map_err(|e| SyncError::Store(e.to_string()))
    }

    async fn request<T, F>(&self, command: TodolistsAction, fulfilled: F) -> Result<T, SyncError>
    where
        F: FnOnce(TodolistsAction) -> Option<T>,
    {
        let Some(request_id) = command.request_id() else {
            return Err(SyncError::Store("action does not start a request".to_string()));
        };
        let operation = command_name(&command);

        let settled = self
            .store
            .send_and_wait_for(
                command,
                move |action| action.settles(request_id),
                self.operation_timeout,
            )
            .await
            .map_err(|e| match e {
                StoreError::Timeout => SyncError::Timeout(operation.to_string()),
                other => SyncError::Store(other.to_string()),
            })?;

        match settled {
            TodolistsAction::Rejected { error, .. } => Err(error),
            outcome => fulfilled(outcome).ok_or_else(|| {
                SyncError::Store(format!("unexpected outcome for {operation} ({request_id})"))
            }),
        }
    }
}

const fn command_name(command: &TodolistsAction) -> &'static str {
    match command {
        TodolistsAction::FetchTodolists { .. } => "fetch_todolists",
        TodolistsAction::AddTodolist { .. } => "add_todolist",
        TodolistsAction::RemoveTodolist { .. } => "remove_todolist",
        TodolistsAction::ChangeTodolistTitle { .. } => "change_todolist_title",
        TodolistsAction::FetchTasks { .. } => "fetch_tasks",
        TodolistsAction::AddTask { .. } => "add_task",
        TodolistsAction::RemoveTask { .. } => "remove_task",
        TodolistsAction::UpdateTask { .. } => "update_task",
        _ => "request",
    }
}
