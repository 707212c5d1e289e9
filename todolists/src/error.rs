//! Error types for the todolists state layer

use crate::types::{TaskId, TodolistId};
use thiserror::Error;

/// Message reported when the server rejects a request without saying why
pub const FALLBACK_ERROR_MESSAGE: &str = "Some error occurred";

/// Errors raised by a [`TodolistsApi`](crate::api::TodolistsApi) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success HTTP status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The response body could not be decoded
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

/// Why a synchronization request did not fulfil
///
/// This is the error half of every awaited client operation and the payload
/// of [`TodolistsAction::Rejected`](crate::action::TodolistsAction::Rejected).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Transport-level failure talking to the backend
    #[error("{0}")]
    Network(String),

    /// The backend rejected the request (non-zero result code)
    #[error("{0}")]
    Server(String),

    /// Update requested for a task that is not in memory
    #[error("Task {task_id} not found in todolist {todolist_id}")]
    TaskNotFound {
        /// Todolist that was searched
        todolist_id: TodolistId,
        /// Missing task
        task_id: TaskId,
    },

    /// No outcome arrived within the operation timeout
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// The store could not accept or settle the request
    #[error("Store unavailable: {0}")]
    Store(String),
}

impl SyncError {
    /// Builds a server rejection from the response messages
    ///
    /// Uses the first message, or [`FALLBACK_ERROR_MESSAGE`] when there is none.
    #[must_use]
    pub fn from_messages(messages: &[String]) -> Self {
        Self::Server(
            messages
                .first()
                .filter(|message| !message.is_empty())
                .cloned()
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()),
        )
    }

    /// Whether this failure is surfaced through the global request status
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server(_))
    }
}

impl From<ApiError> for SyncError {
    /// Transport failures keep their raw message; the other variants have
    /// none and are described instead.
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Transport(message) => Self::Network(message),
            other => Self::Network(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be used
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}
