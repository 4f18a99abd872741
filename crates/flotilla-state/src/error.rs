//! Error types for the task collection.

use thiserror::Error;

/// Result type alias for task collection operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur when working with the task collection.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("task not found: {0}")]
    NotFound(String),
}
