//! The todolists reducer
//!
//! One reducer call is one transaction over [`RootState`]: a lifecycle event
//! updates the todolist slice and the task slice together, so no observer
//! ever sees a todolist without its task bucket or the reverse.

use crate::action::{Operation, TodolistsAction};
use crate::api::TodolistsApi;
use crate::app::AppStatusState;
use crate::coordinator;
use crate::error::SyncError;
use crate::tasks::TasksState;
use crate::todolists::TodolistsState;
use crate::types::{RequestStatus, TaskModel};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use todolists_core::effect::Effect;
use todolists_core::reducer::Reducer;
use todolists_core::{smallvec, SmallVec};

/// Everything the state layer holds
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RootState {
    /// Global request status
    pub app: AppStatusState,
    /// Todolists in display order
    pub todolists: TodolistsState,
    /// Tasks per todolist
    pub tasks: TasksState,
}

impl RootState {
    /// Empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the task buckets match the todolists exactly
    ///
    /// Also requires todolist ids to be unique.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let todolist_ids: HashSet<_> = self.todolists.ids().collect();
        let bucket_ids: HashSet<_> = self.tasks.keys().collect();
        todolist_ids.len() == self.todolists.len() && todolist_ids == bucket_ids
    }
}

/// Dependencies injected into the reducer
#[derive(Clone)]
pub struct TodolistsEnvironment {
    /// The backend
    pub api: Arc<dyn TodolistsApi>,
}

impl TodolistsEnvironment {
    /// Environment talking to `api`
    #[must_use]
    pub fn new(api: Arc<dyn TodolistsApi>) -> Self {
        Self { api }
    }
}

impl std::fmt::Debug for TodolistsEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodolistsEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for todolists, tasks and the global request status
#[derive(Clone, Copy, Debug, Default)]
pub struct TodolistsReducer;

impl TodolistsReducer {
    /// Creates the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn apply_rejection(state: &mut RootState, operation: &Operation, error: &SyncError) {
        if error.is_reported() {
            tracing::warn!(operation = %operation, error = %error, "Request rejected");
            metrics::counter!("todolists.requests.rejected", "operation" => operation.name())
                .increment(1);
            state.app.fail(error.to_string());
        } else {
            tracing::warn!(operation = %operation, error = %error, "Request failed locally");
        }

        if let Some(id) = operation.tracked_row() {
            state
                .todolists
                .set_entity_status_by_id(id, RequestStatus::Failed);
        }
    }
}

impl Reducer for TodolistsReducer {
    type State = RootState;
    type Action = TodolistsAction;
    type Environment = TodolistsEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // Commands
            TodolistsAction::FetchTodolists { request_id } => {
                state.app.start_request();
                smallvec![coordinator::fetch_todolists(env.api.clone(), request_id)]
            },

            TodolistsAction::AddTodolist { request_id, title } => {
                state.app.start_request();
                smallvec![coordinator::add_todolist(env.api.clone(), request_id, title)]
            },

            TodolistsAction::RemoveTodolist { request_id, id } => {
                state.app.start_request();
                state
                    .todolists
                    .set_entity_status_by_id(&id, RequestStatus::Loading);
                smallvec![coordinator::remove_todolist(env.api.clone(), request_id, id)]
            },

            TodolistsAction::ChangeTodolistTitle {
                request_id,
                id,
                title,
            } => {
                state.app.start_request();
                state
                    .todolists
                    .set_entity_status_by_id(&id, RequestStatus::Loading);
                smallvec![coordinator::change_todolist_title(
                    env.api.clone(),
                    request_id,
                    id,
                    title
                )]
            },

            TodolistsAction::FetchTasks {
                request_id,
                todolist_id,
            } => {
                state.app.start_request();
                smallvec![coordinator::fetch_tasks(env.api.clone(), request_id, todolist_id)]
            },

            TodolistsAction::AddTask { request_id, args } => {
                state.app.start_request();
                smallvec![coordinator::add_task(env.api.clone(), request_id, args)]
            },

            TodolistsAction::RemoveTask {
                request_id,
                todolist_id,
                task_id,
            } => {
                state.app.start_request();
                smallvec![coordinator::remove_task(
                    env.api.clone(),
                    request_id,
                    todolist_id,
                    task_id
                )]
            },

            TodolistsAction::UpdateTask {
                request_id,
                todolist_id,
                task_id,
                patch,
            } => {
                let Some(task) = state.tasks.find(&todolist_id, &task_id) else {
                    tracing::warn!(%todolist_id, %task_id, "Task not found in state, update skipped");
                    let operation = Operation::UpdateTask {
                        todolist_id: todolist_id.clone(),
                        task_id: task_id.clone(),
                    };
                    let error = SyncError::TaskNotFound {
                        todolist_id,
                        task_id,
                    };
                    return smallvec![coordinator::reject_locally(request_id, operation, error)];
                };
                let model = TaskModel::merged(task, &patch);
                state.app.start_request();
                smallvec![coordinator::update_task(
                    env.api.clone(),
                    request_id,
                    todolist_id,
                    task_id,
                    model,
                    patch
                )]
            },

            // Local actions
            TodolistsAction::ChangeTodolistFilter { id, filter } => {
                state.todolists.set_filter_by_id(&id, filter);
                smallvec![Effect::None]
            },

            TodolistsAction::ChangeTodolistEntityStatus { id, status } => {
                state.todolists.set_entity_status_by_id(&id, status);
                smallvec![Effect::None]
            },

            TodolistsAction::ClearTodolistsData => {
                state.todolists.clear_all();
                state.tasks.clear_all();
                smallvec![Effect::None]
            },

            TodolistsAction::SetAppStatus { status } => {
                state.app.status = status;
                smallvec![Effect::None]
            },

            TodolistsAction::SetAppError { error } => {
                state.app.error = error;
                smallvec![Effect::None]
            },

            // Fulfilled events
            TodolistsAction::TodolistsFetched { todolists, .. } => {
                state.app.succeed();
                tracing::info!(count = todolists.len(), "Todolists fetched");
                state.tasks.populate_buckets(todolists.iter().map(|t| &t.id));
                state.todolists.replace_all(todolists);
                smallvec![Effect::None]
            },

            TodolistsAction::TodolistAdded { todolist, .. } => {
                state.app.succeed();
                tracing::info!(todolist_id = %todolist.id, "Todolist added");
                state.tasks.create_bucket(todolist.id.clone());
                state.todolists.insert_at_front(todolist);
                smallvec![Effect::None]
            },

            TodolistsAction::TodolistRemoved { id, .. } => {
                state.app.succeed();
                tracing::info!(todolist_id = %id, "Todolist removed");
                state.todolists.remove_by_id(&id);
                state.tasks.delete_bucket(&id);
                smallvec![Effect::None]
            },

            TodolistsAction::TodolistTitleChanged { id, title, .. } => {
                state.app.succeed();
                state.todolists.rename_by_id(&id, title);
                state
                    .todolists
                    .set_entity_status_by_id(&id, RequestStatus::Idle);
                smallvec![Effect::None]
            },

            TodolistsAction::TasksFetched {
                todolist_id, tasks, ..
            } => {
                state.app.succeed();
                if state.todolists.contains(&todolist_id) {
                    state.tasks.set_for_list(todolist_id, tasks);
                } else {
                    tracing::warn!(%todolist_id, "Tasks arrived for a todolist that is gone, dropped");
                }
                smallvec![Effect::None]
            },

            TodolistsAction::TaskAdded { task, .. } => {
                state.app.succeed();
                if let Err(missing) = state.tasks.insert_at_front(task) {
                    tracing::error!(
                        todolist_id = %missing.todolist_id,
                        task_id = %missing.task_id,
                        "Task added for a todolist without a task bucket, dropped"
                    );
                }
                smallvec![Effect::None]
            },

            TodolistsAction::TaskRemoved {
                todolist_id,
                task_id,
                ..
            } => {
                state.app.succeed();
                state.tasks.remove_by_id(&todolist_id, &task_id);
                smallvec![Effect::None]
            },

            TodolistsAction::TaskUpdated {
                todolist_id,
                task_id,
                patch,
                ..
            } => {
                state.app.succeed();
                state.tasks.patch_by_id(&todolist_id, &task_id, &patch);
                smallvec![Effect::None]
            },

            TodolistsAction::Rejected {
                operation, error, ..
            } => {
                Self::apply_rejection(state, &operation, &error);
                smallvec![Effect::None]
            },
        }
    }
}
