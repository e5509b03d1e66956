use thiserror::Error;

/// Errors returned synchronously by registration and lifecycle calls.
///
/// Handler failures never surface here; they are recorded against the
/// task's [`TaskStatus`](crate::TaskStatus) and reported through the
/// [`EventSink`](crate::EventSink).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("task id must not be empty")]
    EmptyTaskId,

    #[error("task '{0}' is already registered")]
    DuplicateTaskId(String),

    #[error("task '{id}' has invalid interval {interval_ms}ms (must be > 0 and at most 365 days)")]
    InvalidInterval { id: String, interval_ms: i128 },

    #[error("task '{0}' has no handler")]
    MissingHandler(String),

    #[error("task '{0}' is not registered")]
    UnknownTaskId(String),

    #[error("no Tokio runtime available to drive timers")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, MatrixError>;
