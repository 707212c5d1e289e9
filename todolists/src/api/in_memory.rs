//! In-process backend honoring the [`TodolistsApi`] contract
//!
//! Assigns ids and timestamps like the real server, lists newest creations
//! first, and answers result code 1 for unknown ids. Failures can be scripted
//! with [`InMemoryTodolistsApi::fail_next`], and every call is recorded.

use super::{GetTasksResponse, ItemData, ResponseEnvelope, TodolistsApi};
use crate::error::ApiError;
use crate::types::{
    AddTaskArgs, Task, TaskId, TaskModel, TaskPriority, TaskStatus, Todolist, TodolistId,
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Longest title the backend accepts
pub const MAX_TITLE_LENGTH: usize = 100;

/// A failure injected into the next call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// The call fails at transport level
    Network(String),
    /// The server refuses the call with these messages
    Rejected(Vec<String>),
}

/// A recorded backend call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `get_todolists`
    GetTodolists,
    /// `create_todolist`
    CreateTodolist {
        /// Requested title
        title: String,
    },
    /// `delete_todolist`
    DeleteTodolist {
        /// Target
        id: TodolistId,
    },
    /// `update_todolist`
    UpdateTodolist {
        /// Target
        id: TodolistId,
        /// Requested title
        title: String,
    },
    /// `get_tasks`
    GetTasks {
        /// Target
        todolist_id: TodolistId,
    },
    /// `create_task`
    CreateTask {
        /// Parent and title
        args: AddTaskArgs,
    },
    /// `delete_task`
    DeleteTask {
        /// Parent
        todolist_id: TodolistId,
        /// Target
        task_id: TaskId,
    },
    /// `update_task`
    UpdateTask {
        /// Parent
        todolist_id: TodolistId,
        /// Target
        task_id: TaskId,
        /// Full model sent
        model: TaskModel,
    },
}

#[derive(Debug, Default)]
struct Backend {
    todolists: Vec<Todolist>,
    tasks: HashMap<TodolistId, Vec<Task>>,
    failures: VecDeque<ScriptedFailure>,
    calls: Vec<ApiCall>,
    next_order: i64,
}

impl Backend {
    fn record(&mut self, call: ApiCall) -> Option<ScriptedFailure> {
        self.calls.push(call);
        self.failures.pop_front()
    }

    fn next_order(&mut self) -> i64 {
        self.next_order -= 1;
        self.next_order
    }

    fn new_todolist(&mut self, title: &str) -> Todolist {
        let todolist = Todolist {
            id: TodolistId::new(Uuid::new_v4().to_string()),
            title: title.to_string(),
            added_date: now(),
            order: self.next_order(),
        };
        self.todolists.insert(0, todolist.clone());
        self.tasks.insert(todolist.id.clone(), Vec::new());
        todolist
    }

    fn new_task(&mut self, args: &AddTaskArgs) -> Option<Task> {
        let order = self.next_order();
        let bucket = self.tasks.get_mut(&args.todolist_id)?;
        let task = Task {
            id: TaskId::new(Uuid::new_v4().to_string()),
            todo_list_id: args.todolist_id.clone(),
            title: args.title.clone(),
            description: None,
            status: TaskStatus::New,
            priority: TaskPriority::Low,
            start_date: None,
            deadline: None,
            order,
            added_date: now(),
        };
        bucket.insert(0, task.clone());
        Some(task)
    }

    fn task_mut(&mut self, todolist_id: &TodolistId, task_id: &TaskId) -> Option<&mut Task> {
        self.tasks
            .get_mut(todolist_id)?
            .iter_mut()
            .find(|task| &task.id == task_id)
    }
}

/// In-memory todolists backend
#[derive(Debug, Default)]
pub struct InMemoryTodolistsApi {
    backend: Mutex<Backend>,
    latency: Option<Duration>,
}

impl InMemoryTodolistsApi {
    /// Empty backend answering immediately
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Stores a todolist without recording a call
    pub fn seed_todolist(&self, title: &str) -> Todolist {
        self.lock().new_todolist(title)
    }

    /// Stores a task without recording a call
    ///
    /// Returns `None` if the todolist does not exist.
    pub fn seed_task(&self, todolist_id: &TodolistId, title: &str) -> Option<Task> {
        self.lock()
            .new_task(&AddTaskArgs::new(todolist_id.clone(), title))
    }

    /// Makes the next call fail; repeated calls queue failures in order
    pub fn fail_next(&self, failure: ScriptedFailure) {
        self.lock().failures.push_back(failure);
    }

    /// Every call received so far
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Number of calls received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Current server-side todolists, newest first
    #[must_use]
    pub fn todolists(&self) -> Vec<Todolist> {
        self.lock().todolists.clone()
    }

    /// Current server-side tasks of a todolist
    #[must_use]
    pub fn tasks(&self, todolist_id: &TodolistId) -> Option<Vec<Task>> {
        self.lock().tasks.get(todolist_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn validate_title(title: &str) -> Result<(), Vec<String>> {
    if title.trim().is_empty() {
        return Err(vec!["Title is required".to_string()]);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(vec![format!(
            "The field Title must be a string with a maximum length of '{MAX_TITLE_LENGTH}'."
        )]);
    }
    Ok(())
}

fn not_found<D: Default>(what: &str) -> ResponseEnvelope<D> {
    ResponseEnvelope::rejected(vec![format!("{what} not found")])
}

#[async_trait]
impl TodolistsApi for InMemoryTodolistsApi {
    async fn get_todolists(&self) -> Result<Vec<Todolist>, ApiError> {
        self.delay().await;
        let mut backend = self.lock();
        match backend.record(ApiCall::GetTodolists) {
            Some(ScriptedFailure::Network(message)) => Err(ApiError::Transport(message)),
            Some(ScriptedFailure::Rejected(messages)) => Err(ApiError::Status {
                status: 400,
                message: messages.join("; "),
            }),
            None => Ok(backend.todolists.clone()),
        }
    }

    async fn create_todolist(
        &self,
        title: &str,
    ) -> Result<ResponseEnvelope<ItemData<Todolist>>, ApiError> {
        self.delay().await;
        let mut backend = self.lock();
        match backend.record(ApiCall::CreateTodolist {
            title: title.to_string(),
        }) {
            Some(ScriptedFailure::Network(message)) => Err(ApiError::Transport(message)),
            Some(ScriptedFailure::Rejected(messages)) => Ok(ResponseEnvelope::rejected(messages)),
            None => Ok(match validate_title(title) {
                Ok(()) => ResponseEnvelope::success(ItemData::new(backend.new_todolist(title))),
                Err(messages) => ResponseEnvelope::rejected(messages),
            }),
        }
    }

    async fn delete_todolist(&self, id: &TodolistId) -> Result<ResponseEnvelope, ApiError> {
        self.delay().await;
        let mut backend = self.lock();
        match backend.record(ApiCall::DeleteTodolist { id: id.clone() }) {
            Some(ScriptedFailure::Network(message)) => Err(ApiError::Transport(message)),
            Some(ScriptedFailure::Rejected(messages)) => Ok(ResponseEnvelope::rejected(messages)),
            None => {
                let before = backend.todolists.len();
                backend.todolists.retain(|todolist| &todolist.id != id);
                if backend.todolists.len() == before {
                    return Ok(not_found("Todolist"));
                }
                backend.tasks.remove(id);
                Ok(ResponseEnvelope::default())
            },
        }
    }

    async fn update_todolist(
        &self,
        id: &TodolistId,
        title: &str,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.delay().await;
        let mut backend = self.lock();
        match backend.record(ApiCall::UpdateTodolist {
            id: id.clone(),
            title: title.to_string(),
        }) {
            Some(ScriptedFailure::Network(message)) => Err(ApiError::Transport(message)),
            Some(ScriptedFailure::Rejected(messages)) => Ok(ResponseEnvelope::rejected(messages)),
            None => {
                if let Err(messages) = validate_title(title) {
                    return Ok(ResponseEnvelope::rejected(messages));
                }
                match backend.todolists.iter_mut().find(|todolist| &todolist.id == id) {
                    Some(todolist) => {
                        todolist.title = title.to_string();
                        Ok(ResponseEnvelope::default())
                    },
                    None => Ok(not_found("Todolist")),
                }
            },
        }
    }

    async fn get_tasks(&self, todolist_id: &TodolistId) -> Result<GetTasksResponse, ApiError> {
        self.delay().await;
        let mut backend = self.lock();
        match backend.record(ApiCall::GetTasks {
            todolist_id: todolist_id.clone(),
        }) {
            Some(ScriptedFailure::Network(message)) => Err(ApiError::Transport(message)),
            Some(ScriptedFailure::Rejected(messages)) => Ok(GetTasksResponse {
                error: Some(messages.into_iter().next().unwrap_or_default()),
                ..GetTasksResponse::default()
            }),
            None => Ok(match backend.tasks.get(todolist_id) {
                Some(items) => GetTasksResponse {
                    items: items.clone(),
                    total_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
                    error: None,
                },
                None => GetTasksResponse {
                    error: Some("Todolist not found".to_string()),
                    ..GetTasksResponse::default()
                },
            }),
        }
    }

    async fn create_task(
        &self,
        args: &AddTaskArgs,
    ) -> Result<ResponseEnvelope<ItemData<Task>>, ApiError> {
        self.delay().await;
        let mut backend = self.lock();
        match backend.record(ApiCall::CreateTask { args: args.clone() }) {
            Some(ScriptedFailure::Network(message)) => Err(ApiError::Transport(message)),
            Some(ScriptedFailure::Rejected(messages)) => Ok(ResponseEnvelope::rejected(messages)),
            None => {
                if let Err(messages) = validate_title(&args.title) {
                    return Ok(ResponseEnvelope::rejected(messages));
                }
                Ok(backend
                    .new_task(args)
                    .map_or_else(|| not_found("Todolist"), |task| {
                        ResponseEnvelope::success(ItemData::new(task))
                    }))
            },
        }
    }

    async fn delete_task(
        &self,
        todolist_id: &TodolistId,
        task_id: &TaskId,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.delay().await;
        let mut backend = self.lock();
        match backend.record(ApiCall::DeleteTask {
            todolist_id: todolist_id.clone(),
            task_id: task_id.clone(),
        }) {
            Some(ScriptedFailure::Network(message)) => Err(ApiError::Transport(message)),
            Some(ScriptedFailure::Rejected(messages)) => Ok(ResponseEnvelope::rejected(messages)),
            None => {
                let Some(bucket) = backend.tasks.get_mut(todolist_id) else {
                    return Ok(not_found("Todolist"));
                };
                let before = bucket.len();
                bucket.retain(|task| &task.id != task_id);
                if bucket.len() == before {
                    return Ok(not_found("Task"));
                }
                Ok(ResponseEnvelope::default())
            },
        }
    }

    async fn update_task(
        &self,
        todolist_id: &TodolistId,
        task_id: &TaskId,
        model: &TaskModel,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.delay().await;
        let mut backend = self.lock();
        match backend.record(ApiCall::UpdateTask {
            todolist_id: todolist_id.clone(),
            task_id: task_id.clone(),
            model: model.clone(),
        }) {
            Some(ScriptedFailure::Network(message)) => Err(ApiError::Transport(message)),
            Some(ScriptedFailure::Rejected(messages)) => Ok(ResponseEnvelope::rejected(messages)),
            None => {
                if let Err(messages) = validate_title(&model.title) {
                    return Ok(ResponseEnvelope::rejected(messages));
                }
                let Some(task) = backend.task_mut(todolist_id, task_id) else {
                    return Ok(not_found("Task"));
                };
                task.title.clone_from(&model.title);
                task.description.clone_from(&model.description);
                task.status = model.status;
                task.priority = model.priority;
                task.start_date = model.start_date;
                task.deadline = model.deadline;
                Ok(ResponseEnvelope::default())
            },
        }
    }
}
