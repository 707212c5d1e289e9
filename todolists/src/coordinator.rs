//! Effects that talk to the backend
//!
//! Each builder wraps one remote call in an [`Effect::Future`]. The future
//! always resolves to exactly one action: the fulfilled event on success, or
//! [`TodolistsAction::Rejected`] carrying the same request id on any failure.
//! Nothing escapes an effect except that action.

use crate::action::{Operation, TodolistsAction};
use crate::api::{ItemData, ResponseEnvelope, TodolistsApi};
use crate::error::{ApiError, SyncError};
use crate::types::{AddTaskArgs, RequestId, TaskId, TaskModel, TaskPatch, TodolistId};
use std::sync::Arc;
use todolists_core::effect::Effect;

/// Result-code check for envelope responses
fn checked<D>(response: Result<ResponseEnvelope<D>, ApiError>) -> Result<D, SyncError> {
    response.map_err(SyncError::from)?.into_result()
}

/// Unwraps the created record of an accepted response
fn created<T>(response: Result<ResponseEnvelope<ItemData<T>>, ApiError>) -> Result<T, SyncError> {
    checked(response)?
        .item
        .ok_or_else(|| SyncError::Server("Response did not include the created item".to_string()))
}

fn settle<T, F>(
    request_id: RequestId,
    operation: Operation,
    outcome: Result<T, SyncError>,
    fulfilled: F,
) -> TodolistsAction
where
    F: FnOnce(T) -> TodolistsAction,
{
    match outcome {
        Ok(value) => fulfilled(value),
        Err(error) => rejected(request_id, operation, error),
    }
}

/// Rejection action for a request
#[must_use]
pub fn rejected(request_id: RequestId, operation: Operation, error: SyncError) -> TodolistsAction {
    TodolistsAction::Rejected {
        request_id,
        operation,
        error,
    }
}

/// Fetches every todolist
pub fn fetch_todolists(
    api: Arc<dyn TodolistsApi>,
    request_id: RequestId,
) -> Effect<TodolistsAction> {
    Effect::future(async move {
        let outcome = api.get_todolists().await.map_err(SyncError::from);
        Some(settle(request_id, Operation::FetchTodolists, outcome, |todolists| {
            TodolistsAction::TodolistsFetched {
                request_id,
                todolists,
            }
        }))
    })
}

/// Creates a todolist
pub fn add_todolist(
    api: Arc<dyn TodolistsApi>,
    request_id: RequestId,
    title: String,
) -> Effect<TodolistsAction> {
    Effect::future(async move {
        let outcome = created(api.create_todolist(&title).await);
        Some(settle(request_id, Operation::AddTodolist, outcome, |todolist| {
            TodolistsAction::TodolistAdded {
                request_id,
                todolist,
            }
        }))
    })
}

/// Deletes a todolist
pub fn remove_todolist(
    api: Arc<dyn TodolistsApi>,
    request_id: RequestId,
    id: TodolistId,
) -> Effect<TodolistsAction> {
    Effect::future(async move {
        let outcome = checked(api.delete_todolist(&id).await);
        let operation = Operation::RemoveTodolist { id: id.clone() };
        Some(settle(request_id, operation, outcome, |_| {
            TodolistsAction::TodolistRemoved { request_id, id }
        }))
    })
}

/// Renames a todolist
pub fn change_todolist_title(
    api: Arc<dyn TodolistsApi>,
    request_id: RequestId,
    id: TodolistId,
    title: String,
) -> Effect<TodolistsAction> {
    Effect::future(async move {
        let outcome = checked(api.update_todolist(&id, &title).await);
        let operation = Operation::ChangeTodolistTitle { id: id.clone() };
        Some(settle(request_id, operation, outcome, |_| {
            TodolistsAction::TodolistTitleChanged {
                request_id,
                id,
                title,
            }
        }))
    })
}

/// Fetches the tasks of a todolist
pub fn fetch_tasks(
    api: Arc<dyn TodolistsApi>,
    request_id: RequestId,
    todolist_id: TodolistId,
) -> Effect<TodolistsAction> {
    Effect::future(async move {
        let outcome = api
            .get_tasks(&todolist_id)
            .await
            .map_err(SyncError::from)
            .and_then(crate::api::GetTasksResponse::into_result);
        let operation = Operation::FetchTasks {
            todolist_id: todolist_id.clone(),
        };
        Some(settle(request_id, operation, outcome, |tasks| {
            TodolistsAction::TasksFetched {
                request_id,
                todolist_id,
                tasks,
            }
        }))
    })
}

/// Creates a task
pub fn add_task(
    api: Arc<dyn TodolistsApi>,
    request_id: RequestId,
    args: AddTaskArgs,
) -> Effect<TodolistsAction> {
    Effect::future(async move {
        let outcome = created(api.create_task(&args).await);
        let operation = Operation::AddTask {
            todolist_id: args.todolist_id,
        };
        Some(settle(request_id, operation, outcome, |task| {
            TodolistsAction::TaskAdded { request_id, task }
        }))
    })
}

/// Deletes a task
pub fn remove_task(
    api: Arc<dyn TodolistsApi>,
    request_id: RequestId,
    todolist_id: TodolistId,
    task_id: TaskId,
) -> Effect<TodolistsAction> {
    Effect::future(async move {
        let outcome = checked(api.delete_task(&todolist_id, &task_id).await);
        let operation = Operation::RemoveTask {
            todolist_id: todolist_id.clone(),
            task_id: task_id.clone(),
        };
        Some(settle(request_id, operation, outcome, |_| {
            TodolistsAction::TaskRemoved {
                request_id,
                todolist_id,
                task_id,
            }
        }))
    })
}

/// Sends the merged model of a task update
///
/// The fulfilled event carries the caller's `patch`, which is what the slice
/// merges into the in-memory task.
pub fn update_task(
    api: Arc<dyn TodolistsApi>,
    request_id: RequestId,
    todolist_id: TodolistId,
    task_id: TaskId,
    model: TaskModel,
    patch: TaskPatch,
) -> Effect<TodolistsAction> {
    Effect::future(async move {
        let outcome = checked(api.update_task(&todolist_id, &task_id, &model).await);
        let operation = Operation::UpdateTask {
            todolist_id: todolist_id.clone(),
            task_id: task_id.clone(),
        };
        Some(settle(request_id, operation, outcome, |_| {
            TodolistsAction::TaskUpdated {
                request_id,
                todolist_id,
                task_id,
                patch,
            }
        }))
    })
}

/// Rejects a request without contacting the backend
pub fn reject_locally(
    request_id: RequestId,
    operation: Operation,
    error: SyncError,
) -> Effect<TodolistsAction> {
    Effect::future(async move { Some(rejected(request_id, operation, error)) })
}
