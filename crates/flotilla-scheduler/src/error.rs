//! Scheduler error types.

use thiserror::Error;

/// Result type alias for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors that surface from a reconciliation pass or task registration.
///
/// Only failures to *plan or launch* an action are returned; failures
/// discovered via asynchronous runtime feedback are logged and resolved
/// by later observation passes.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("task already managed: {0}")]
    AlreadyManaged(String),

    #[error("no running container of task {0} to stop")]
    NoContainerToStop(String),

    #[error("runtime error: {0}")]
    Runtime(#[from] flotilla_runtime::RuntimeError),
}
