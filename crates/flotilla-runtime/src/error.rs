//! Error types for runtime backends.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors reported by a container runtime backend.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The engine rejected or failed an API call.
    #[error("runtime api error: {0}")]
    Api(String),

    /// No container matches the given ID (or ID prefix).
    #[error("no such container: {0}")]
    NotFound(String),

    /// Image pull or resolution failed.
    #[error("image error: {0}")]
    Image(String),
}
