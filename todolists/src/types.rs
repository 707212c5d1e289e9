//! Domain types shared by the slices, the coordinator and the REST client.
//!
//! Server records ([`Todolist`], [`Task`]) mirror the backend's JSON shape
//! (camelCase, integer-coded enums). Client-only annotations such as the
//! display filter live in the slice types instead.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a server-assigned identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a todolist, assigned by the server
    TodolistId
);

string_id!(
    /// Identifier of a task, unique within its todolist
    TaskId
);

/// Correlates a command with the fulfilled or rejected action it ends in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random `RequestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which tasks of a todolist the UI shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterValue {
    /// Every task
    #[default]
    All,
    /// Tasks not yet completed
    Active,
    /// Completed tasks only
    Completed,
}

impl FilterValue {
    /// Whether a task is visible under this filter
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.is_completed(),
            Self::Completed => task.is_completed(),
        }
    }
}

/// Progress of a request, globally or for a single todolist row
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Nothing in flight
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The last request succeeded
    Succeeded,
    /// The last request failed
    Failed,
}

/// A wire value that does not map to any known enum variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {kind} code {value}")]
pub struct UnknownCode {
    /// Name of the enum being decoded
    pub kind: &'static str,
    /// The offending value
    pub value: u8,
}

/// Workflow status of a task (integer-coded on the wire)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskStatus {
    /// Freshly created
    #[default]
    New = 0,
    /// Being worked on
    InProgress = 1,
    /// Done
    Completed = 2,
    /// Not ready yet
    Draft = 3,
}

impl TryFrom<u8> for TaskStatus {
    type Error = UnknownCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::New),
            1 => Ok(Self::InProgress),
            2 => Ok(Self::Completed),
            3 => Ok(Self::Draft),
            value => Err(UnknownCode {
                kind: "task status",
                value,
            }),
        }
    }
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> Self {
        status as Self
    }
}

/// Priority of a task (integer-coded on the wire)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskPriority {
    /// Low
    #[default]
    Low = 0,
    /// Medium
    Medium = 1,
    /// High
    High = 2,
    /// Urgent
    Urgent = 3,
    /// Someday
    Later = 4,
}

impl TryFrom<u8> for TaskPriority {
    type Error = UnknownCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Low),
            1 => Ok(Self::Medium),
            2 => Ok(Self::High),
            3 => Ok(Self::Urgent),
            4 => Ok(Self::Later),
            value => Err(UnknownCode {
                kind: "task priority",
                value,
            }),
        }
    }
}

impl From<TaskPriority> for u8 {
    fn from(priority: TaskPriority) -> Self {
        priority as Self
    }
}

/// A todolist as the server returns it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todolist {
    /// Server-assigned identifier
    pub id: TodolistId,
    /// Title
    pub title: String,
    /// Creation timestamp
    pub added_date: NaiveDateTime,
    /// Server-defined ordering key
    pub order: i64,
}

/// A task as the server returns it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier, unique within the parent todolist
    pub id: TaskId,
    /// Parent todolist
    pub todo_list_id: TodolistId,
    /// Title
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status
    pub status: TaskStatus,
    /// Priority
    pub priority: TaskPriority,
    /// Planned start
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    /// Due date
    #[serde(default)]
    pub deadline: Option<NaiveDateTime>,
    /// Server-defined ordering key
    #[serde(default)]
    pub order: i64,
    /// Creation timestamp
    pub added_date: NaiveDateTime,
}

impl Task {
    /// Whether the task is done
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Overwrites the fields set in `patch`
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
        }
    }
}

/// Partial task update; `None` leaves a field untouched
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New status
    pub status: Option<TaskStatus>,
    /// New priority
    pub priority: Option<TaskPriority>,
    /// New start date
    pub start_date: Option<NaiveDateTime>,
    /// New deadline
    pub deadline: Option<NaiveDateTime>,
}

impl TaskPatch {
    /// Patch changing only the status
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Patch changing only the title
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Full task model the server expects on update
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskModel {
    /// Title
    pub title: String,
    /// Description
    pub description: Option<String>,
    /// Status
    pub status: TaskStatus,
    /// Priority
    pub priority: TaskPriority,
    /// Start date
    pub start_date: Option<NaiveDateTime>,
    /// Deadline
    pub deadline: Option<NaiveDateTime>,
}

impl TaskModel {
    /// Current field values of `task` with `patch` laid over them
    #[must_use]
    pub fn merged(task: &Task, patch: &TaskPatch) -> Self {
        Self {
            title: patch.title.clone().unwrap_or_else(|| task.title.clone()),
            description: patch.description.clone().or_else(|| task.description.clone()),
            status: patch.status.unwrap_or(task.status),
            priority: patch.priority.unwrap_or(task.priority),
            start_date: patch.start_date.or(task.start_date),
            deadline: patch.deadline.or(task.deadline),
        }
    }
}

impl From<&Task> for TaskModel {
    fn from(task: &Task) -> Self {
        Self::merged(task, &TaskPatch::default())
    }
}

/// Arguments for creating a task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTaskArgs {
    /// Todolist receiving the task
    pub todolist_id: TodolistId,
    /// Title of the new task
    pub title: String,
}

impl AddTaskArgs {
    /// Creates task arguments
    #[must_use]
    pub fn new(todolist_id: TodolistId, title: impl Into<String>) -> Self {
        Self {
            todolist_id,
            title: title.into(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::task;
    use super::*;

    #[test]
    fn merged_model_keeps_unpatched_fields() {
        let mut existing = task("X", "t1", "old");
        existing.description = Some("notes".into());

        let model = TaskModel::merged(&existing, &TaskPatch::status(TaskStatus::Completed));

        assert_eq!(model.title, "old");
        assert_eq!(model.description.as_deref(), Some("notes"));
        assert_eq!(model.status, TaskStatus::Completed);
        assert_eq!(model.priority, TaskPriority::Low);
    }

    #[test]
    fn apply_patch_changes_only_set_fields() {
        let mut t = task("X", "t1", "old");
        let before = t.clone();

        t.apply_patch(&TaskPatch::status(TaskStatus::Completed));

        assert_eq!(t.status, TaskStatus::Completed);
        assert_eq!(
            Task {
                status: before.status,
                ..t.clone()
            },
            before
        );
    }

    #[test]
    fn enums_use_integer_codes() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&TaskStatus::Completed)?, "2");
        assert_eq!(serde_json::to_string(&TaskPriority::Later)?, "4");
        assert_eq!(serde_json::from_str::<TaskPriority>("3")?, TaskPriority::Urgent);
        assert!(serde_json::from_str::<TaskStatus>("9").is_err());
        Ok(())
    }

    #[test]
    fn task_decodes_server_json() -> Result<(), serde_json::Error> {
        let json = r#"{
            "id": "t-1",
            "todoListId": "tl-1",
            "title": "Buy milk",
            "description": null,
            "status": 1,
            "priority": 2,
            "startDate": null,
            "deadline": "2024-05-01T12:00:00",
            "order": -3,
            "addedDate": "2024-04-30T08:15:00.123"
        }"#;

        let decoded: Task = serde_json::from_str(json)?;

        assert_eq!(decoded.todo_list_id, TodolistId::new("tl-1"));
        assert_eq!(decoded.status, TaskStatus::InProgress);
        assert_eq!(decoded.priority, TaskPriority::High);
        assert!(decoded.deadline.is_some());
        assert_eq!(decoded.order, -3);
        Ok(())
    }

    #[test]
    fn filter_matches_completion() {
        let mut done = task("X", "t1", "done");
        done.status = TaskStatus::Completed;
        let open = task("X", "t2", "open");

        assert!(FilterValue::All.matches(&done));
        assert!(FilterValue::Completed.matches(&done));
        assert!(!FilterValue::Completed.matches(&open));
        assert!(FilterValue::Active.matches(&open));
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch::title("x").is_empty());
    }
}
