//! Subscriber bulk-registration helper
//!
//! A subscriber declares every pattern it wants to listen on; the manager
//! registers them all in one call via
//! [`subscribe`](crate::bus::manager::EventManager::subscribe).

use crate::bus::listener::Listener;
use crate::core::priority;
use std::sync::Arc;

/// One declared registration: pattern, priority and listener.
pub struct Subscription {
    pub name: String,
    pub priority: i32,
    pub listener: Arc<dyn Listener>,
}

impl Subscription {
    pub fn new(name: impl Into<String>, listener: Arc<dyn Listener>) -> Self {
        Self::with_priority(name, listener, priority::NORMAL)
    }

    pub fn with_priority(name: impl Into<String>, listener: Arc<dyn Listener>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            listener,
        }
    }
}

/// Implemented by components listening on several patterns at once.
pub trait Subscriber {
    fn subscriptions(&self) -> Vec<Subscription>;
}
