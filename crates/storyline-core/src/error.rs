//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input was rejected before reaching storage.
    #[error("validation error: {0}")]
    Validation(String),

    /// No story is stored under the given id.
    #[error("story not found: {0}")]
    StoryNotFound(String),

    /// The underlying store rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),
}
