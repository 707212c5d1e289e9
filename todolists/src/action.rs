//! Actions processed by the todolists reducer
//!
//! Commands carry a [`RequestId`]; the effect they start ends in exactly one
//! fulfilled event or one [`TodolistsAction::Rejected`] carrying the same id.
//! Local actions change client-only state and never reach the backend.

use crate::error::SyncError;
use crate::types::{
    AddTaskArgs, FilterValue, RequestId, RequestStatus, Task, TaskId, TaskPatch, Todolist,
    TodolistId,
};

/// The remote operation a rejection belongs to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Fetch every todolist
    FetchTodolists,
    /// Create a todolist
    AddTodolist,
    /// Delete a todolist
    RemoveTodolist {
        /// Target todolist
        id: TodolistId,
    },
    /// Rename a todolist
    ChangeTodolistTitle {
        /// Target todolist
        id: TodolistId,
    },
    /// Fetch the tasks of a todolist
    FetchTasks {
        /// Target todolist
        todolist_id: TodolistId,
    },
    /// Create a task
    AddTask {
        /// Parent todolist
        todolist_id: TodolistId,
    },
    /// Delete a task
    RemoveTask {
        /// Parent todolist
        todolist_id: TodolistId,
        /// Target task
        task_id: TaskId,
    },
    /// Update a task
    UpdateTask {
        /// Parent todolist
        todolist_id: TodolistId,
        /// Target task
        task_id: TaskId,
    },
}

impl Operation {
    /// Short operation name for logs and timeouts
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FetchTodolists => "fetch_todolists",
            Self::AddTodolist => "add_todolist",
            Self::RemoveTodolist { .. } => "remove_todolist",
            Self::ChangeTodolistTitle { .. } => "change_todolist_title",
            Self::FetchTasks { .. } => "fetch_tasks",
            Self::AddTask { .. } => "add_task",
            Self::RemoveTask { .. } => "remove_task",
            Self::UpdateTask { .. } => "update_task",
        }
    }

    /// Todolist row whose entity status tracks this operation, if any
    #[must_use]
    pub const fn tracked_row(&self) -> Option<&TodolistId> {
        match self {
            Self::RemoveTodolist { id } | Self::ChangeTodolistTitle { id } => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Every input to [`TodolistsReducer`](crate::reducer::TodolistsReducer)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodolistsAction {
    // Commands
    /// Fetch every todolist from the server
    FetchTodolists {
        /// Correlation id
        request_id: RequestId,
    },
    /// Create a todolist
    AddTodolist {
        /// Correlation id
        request_id: RequestId,
        /// Title of the new todolist
        title: String,
    },
    /// Delete a todolist
    RemoveTodolist {
        /// Correlation id
        request_id: RequestId,
        /// Target todolist
        id: TodolistId,
    },
    /// Rename a todolist
    ChangeTodolistTitle {
        /// Correlation id
        request_id: RequestId,
        /// Target todolist
        id: TodolistId,
        /// New title
        title: String,
    },
    /// Fetch the tasks of a todolist
    FetchTasks {
        /// Correlation id
        request_id: RequestId,
        /// Target todolist
        todolist_id: TodolistId,
    },
    /// Create a task
    AddTask {
        /// Correlation id
        request_id: RequestId,
        /// Parent todolist and title
        args: AddTaskArgs,
    },
    /// Delete a task
    RemoveTask {
        /// Correlation id
        request_id: RequestId,
        /// Parent todolist
        todolist_id: TodolistId,
        /// Target task
        task_id: TaskId,
    },
    /// Update some fields of a task
    UpdateTask {
        /// Correlation id
        request_id: RequestId,
        /// Parent todolist
        todolist_id: TodolistId,
        /// Target task
        task_id: TaskId,
        /// Fields to change
        patch: TaskPatch,
    },

    // Local actions
    /// Change the display filter of a todolist
    ChangeTodolistFilter {
        /// Target todolist
        id: TodolistId,
        /// New filter
        filter: FilterValue,
    },
    /// Override the entity status of a todolist row
    ChangeTodolistEntityStatus {
        /// Target todolist
        id: TodolistId,
        /// New status
        status: RequestStatus,
    },
    /// Drop every todolist and task (logout)
    ClearTodolistsData,
    /// Override the global request status
    SetAppStatus {
        /// New status
        status: RequestStatus,
    },
    /// Override the global error message
    SetAppError {
        /// New message, `None` to dismiss
        error: Option<String>,
    },

    // Fulfilled events
    /// Todolists arrived from the server
    TodolistsFetched {
        /// Correlation id
        request_id: RequestId,
        /// Server records
        todolists: Vec<Todolist>,
    },
    /// The server created a todolist
    TodolistAdded {
        /// Correlation id
        request_id: RequestId,
        /// Server record
        todolist: Todolist,
    },
    /// The server deleted a todolist
    TodolistRemoved {
        /// Correlation id
        request_id: RequestId,
        /// Deleted todolist
        id: TodolistId,
    },
    /// The server renamed a todolist
    TodolistTitleChanged {
        /// Correlation id
        request_id: RequestId,
        /// Renamed todolist
        id: TodolistId,
        /// Confirmed title
        title: String,
    },
    /// Tasks of one todolist arrived from the server
    TasksFetched {
        /// Correlation id
        request_id: RequestId,
        /// Parent todolist
        todolist_id: TodolistId,
        /// Server records
        tasks: Vec<Task>,
    },
    /// The server created a task
    TaskAdded {
        /// Correlation id
        request_id: RequestId,
        /// Server record
        task: Task,
    },
    /// The server deleted a task
    TaskRemoved {
        /// Correlation id
        request_id: RequestId,
        /// Parent todolist
        todolist_id: TodolistId,
        /// Deleted task
        task_id: TaskId,
    },
    /// The server accepted a task update
    TaskUpdated {
        /// Correlation id
        request_id: RequestId,
        /// Parent todolist
        todolist_id: TodolistId,
        /// Updated task
        task_id: TaskId,
        /// Fields that changed
        patch: TaskPatch,
    },

    /// A command did not fulfil
    Rejected {
        /// Correlation id
        request_id: RequestId,
        /// What was attempted
        operation: Operation,
        /// Why it failed
        error: SyncError,
    },
}

impl TodolistsAction {
    /// Correlation id of a command or of its outcome
    #[must_use]
    pub const fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::FetchTodolists { request_id }
            | Self::AddTodolist { request_id, .. }
            | Self::RemoveTodolist { request_id, .. }
            | Self::ChangeTodolistTitle { request_id, .. }
            | Self::FetchTasks { request_id, .. }
            | Self::AddTask { request_id, .. }
            | Self::RemoveTask { request_id, .. }
            | Self::UpdateTask { request_id, .. }
            | Self::TodolistsFetched { request_id, .. }
            | Self::TodolistAdded { request_id, .. }
            | Self::TodolistRemoved { request_id, .. }
            | Self::TodolistTitleChanged { request_id, .. }
            | Self::TasksFetched { request_id, .. }
            | Self::TaskAdded { request_id, .. }
            | Self::TaskRemoved { request_id, .. }
            | Self::TaskUpdated { request_id, .. }
            | Self::Rejected { request_id, .. } => Some(*request_id),
            Self::ChangeTodolistFilter { .. }
            | Self::ChangeTodolistEntityStatus { .. }
            | Self::ClearTodolistsData
            | Self::SetAppStatus { .. }
            | Self::SetAppError { .. } => None,
        }
    }

    /// Whether this action ends a request (fulfilled or rejected)
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::TodolistsFetched { .. }
                | Self::TodolistAdded { .. }
                | Self::TodolistRemoved { .. }
                | Self::TodolistTitleChanged { .. }
                | Self::TasksFetched { .. }
                | Self::TaskAdded { .. }
                | Self::TaskRemoved { .. }
                | Self::TaskUpdated { .. }
                | Self::Rejected { .. }
        )
    }

    /// Whether this action settles the request `request_id`
    #[must_use]
    pub fn settles(&self, request_id: RequestId) -> bool {
        self.is_settled() && self.request_id() == Some(request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_settle_their_own_request() {
        let request_id = RequestId::new();
        let fulfilled = TodolistsAction::TodolistRemoved {
            request_id,
            id: "X".into(),
        };
        let rejected = TodolistsAction::Rejected {
            request_id,
            operation: Operation::FetchTodolists,
            error: SyncError::Network("down".into()),
        };

        assert!(fulfilled.settles(request_id));
        assert!(rejected.settles(request_id));
        assert!(!fulfilled.settles(RequestId::new()));
    }

    #[test]
    fn commands_and_local_actions_do_not_settle() {
        let request_id = RequestId::new();
        let command = TodolistsAction::FetchTodolists { request_id };

        assert_eq!(command.request_id(), Some(request_id));
        assert!(!command.settles(request_id));
        assert_eq!(TodolistsAction::ClearTodolistsData.request_id(), None);
    }

    #[test]
    fn only_row_operations_track_entity_status() {
        let id = TodolistId::new("X");
        assert_eq!(
            Operation::RemoveTodolist { id: id.clone() }.tracked_row(),
            Some(&id)
        );
        assert_eq!(
            Operation::FetchTasks { todolist_id: id }.tracked_row(),
            None
        );
        assert_eq!(Operation::AddTodolist.to_string(), "add_todolist");
    }
}
