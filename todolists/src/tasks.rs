//! Task slice: one ordered bucket of tasks per todolist

use crate::types::{FilterValue, Task, TaskId, TaskPatch, TodolistId};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// A task arrived for a todolist that has no bucket
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No task bucket for todolist {todolist_id} (task {task_id})")]
pub struct MissingBucket {
    /// Parent the task claims
    pub todolist_id: TodolistId,
    /// Task that could not be stored
    pub task_id: TaskId,
}

/// Tasks keyed by parent todolist id
///
/// Buckets are created and deleted together with their todolist, so the key
/// set always equals the ids held by [`TodolistsState`](crate::todolists::TodolistsState).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TasksState {
    buckets: HashMap<TodolistId, Vec<Task>>,
}

impl TasksState {
    /// Empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces (or creates) the bucket of a todolist
    pub fn set_for_list(&mut self, todolist_id: TodolistId, tasks: Vec<Task>) {
        self.buckets.insert(todolist_id, tasks);
    }

    /// Prepends a created task to its parent's bucket
    ///
    /// # Errors
    ///
    /// Returns [`MissingBucket`] if the parent has no bucket; the task is dropped.
    pub fn insert_at_front(&mut self, task: Task) -> Result<(), MissingBucket> {
        match self.buckets.get_mut(&task.todo_list_id) {
            Some(bucket) => {
                bucket.insert(0, task);
                Ok(())
            },
            None => Err(MissingBucket {
                todolist_id: task.todo_list_id,
                task_id: task.id,
            }),
        }
    }

    /// Removes a task; absent ids are ignored
    pub fn remove_by_id(&mut self, todolist_id: &TodolistId, task_id: &TaskId) -> Option<Task> {
        let bucket = self.buckets.get_mut(todolist_id)?;
        let index = bucket.iter().position(|task| &task.id == task_id)?;
        Some(bucket.remove(index))
    }

    /// Merges the set fields of `patch` into a task; absent ids are ignored
    pub fn patch_by_id(&mut self, todolist_id: &TodolistId, task_id: &TaskId, patch: &TaskPatch) {
        if let Some(task) = self
            .buckets
            .get_mut(todolist_id)
            .and_then(|bucket| bucket.iter_mut().find(|task| &task.id == task_id))
        {
            task.apply_patch(patch);
        }
    }

    /// Creates an empty bucket for a new todolist
    pub fn create_bucket(&mut self, todolist_id: TodolistId) {
        self.buckets.insert(todolist_id, Vec::new());
    }

    /// Deletes the bucket of a removed todolist
    pub fn delete_bucket(&mut self, todolist_id: &TodolistId) {
        self.buckets.remove(todolist_id);
    }

    /// Creates an empty bucket per fetched todolist
    pub fn populate_buckets<'a>(&mut self, todolist_ids: impl IntoIterator<Item = &'a TodolistId>) {
        for id in todolist_ids {
            self.buckets.insert(id.clone(), Vec::new());
        }
    }

    /// Drops every bucket
    pub fn clear_all(&mut self) {
        self.buckets.clear();
    }

    /// Tasks of a todolist, newest first
    #[must_use]
    pub fn bucket(&self, todolist_id: &TodolistId) -> Option<&[Task]> {
        self.buckets.get(todolist_id).map(Vec::as_slice)
    }

    /// Looks a task up
    #[must_use]
    pub fn find(&self, todolist_id: &TodolistId, task_id: &TaskId) -> Option<&Task> {
        self.buckets
            .get(todolist_id)?
            .iter()
            .find(|task| &task.id == task_id)
    }

    /// Whether a todolist has a bucket
    #[must_use]
    pub fn has_bucket(&self, todolist_id: &TodolistId) -> bool {
        self.buckets.contains_key(todolist_id)
    }

    /// Todolist ids with a bucket, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &TodolistId> {
        self.buckets.keys()
    }

    /// Number of buckets
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether there are no buckets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Tasks of a todolist shown under `filter`
    #[must_use]
    pub fn visible(&self, todolist_id: &TodolistId, filter: FilterValue) -> Vec<&Task> {
        self.bucket(todolist_id)
            .unwrap_or_default()
            .iter()
            .filter(|task| filter.matches(task))
            .collect()
    }
}
