//! Cancellation token for mid-dispatch cancellation
//!
//! Only a token-bearing event supports cancellation once fired; the check
//! between listener invocations is non-blocking, so a long-running listener
//! is not preemptible mid-execution. A timeout is a property of the token,
//! not of the manager.

use crate::bus::error::{EventError, EventResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct CancelInner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

/// Shared cancellation flag with an optional deadline.
///
/// Cloning yields another handle to the same flag; any clone can cancel.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl PartialEq for CancelToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                deadline: None,
            }),
        }
    }

    /// Token that cancels itself once the timeout elapses.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                deadline: Some(Instant::now() + timeout),
            }),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        // Release pairs with the Acquire load in is_cancelled so dispatch
        // threads observe the store.
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Non-blocking poll: explicitly cancelled, or past the deadline.
    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return true;
        }
        match self.inner.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// The token's own error, used to short-circuit a dispatch.
    pub fn check(&self, event_name: &str) -> EventResult<()> {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return Err(EventError::Cancelled {
                event: event_name.to_string(),
            });
        }
        if let Some(deadline) = self.inner.deadline {
            if Instant::now() >= deadline {
                return Err(EventError::DeadlineExceeded {
                    event: event_name.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
