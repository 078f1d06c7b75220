//! Dispatch Error Types

/// Errors surfaced by registration and dispatch.
///
/// `Clone` so the worker pool can retain the most recent failure for
/// [`wait`](crate::bus::manager::EventManager::wait) while also logging it.
/// Note that aborting an event is not an error: a listener that sets the
/// abort flag and returns `Ok` stops the chain with an overall `Ok`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("invalid event name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("listener error: {0}")]
    Listener(String),

    #[error("event '{event}' was cancelled")]
    Cancelled { event: String },

    #[error("event '{event}' exceeded its deadline")]
    DeadlineExceeded { event: String },

    #[error("async channel is closed")]
    Closed,

    #[error("synchronisation failure: {0}")]
    Lock(String),
}

impl EventError {
    /// Shorthand for listener handler code reporting a failure.
    pub fn listener(message: impl Into<String>) -> Self {
        EventError::Listener(message.into())
    }
}

/// Result type for bus operations
pub type EventResult<T> = Result<T, EventError>;
