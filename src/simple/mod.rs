//! Simplified positional-argument event manager
//!
//! A lite variant of the bus for callers that want positional arguments
//! instead of a keyed data bag: exact-name handler lists plus the bare
//! catch-all, no priorities, no wildcard grouping, no async path. Handlers
//! run in registration order; an error or abort stops the chain.
//!
//! Not internally synchronized - wrap in a lock to share across threads.

use crate::bus::error::{EventError, EventResult};
use crate::core::name::WILDCARD;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Positional-argument event passed to simple handlers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimpleEvent {
    name: String,
    args: Vec<Value>,
    aborted: bool,
}

impl SimpleEvent {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
            aborted: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument by position; `None` past the end.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

type Handler = Box<dyn Fn(&mut SimpleEvent) -> EventResult<()> + Send + Sync>;

/// Exact-name handler registry.
#[derive(Default)]
pub struct SimpleManager {
    handlers: HashMap<String, Vec<Handler>>,
}

impl SimpleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Only trimmed non-empty names are accepted; the
    /// full pattern grammar does not apply here.
    pub fn on<F>(&mut self, name: &str, handler: F) -> EventResult<()>
    where
        F: Fn(&mut SimpleEvent) -> EventResult<()> + Send + Sync + 'static,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(EventError::InvalidName {
                name: name.to_string(),
                reason: "event name cannot be empty".to_string(),
            });
        }
        self.handlers
            .entry(name.to_string())
            .or_default()
            .push(Box::new(handler));
        Ok(())
    }

    /// Fire exact-name handlers, then the catch-all. Unknown names fire
    /// only the catch-all; no handlers at all is silent success.
    pub fn fire(&self, name: &str, args: Vec<Value>) -> EventResult<SimpleEvent> {
        let mut event = SimpleEvent::new(name, args);

        if let Some(handlers) = self.handlers.get(name) {
            Self::call_handlers(&mut event, handlers)?;
            if event.is_aborted() {
                return Ok(event);
            }
        }
        if name != WILDCARD {
            if let Some(handlers) = self.handlers.get(WILDCARD) {
                Self::call_handlers(&mut event, handlers)?;
            }
        }
        Ok(event)
    }

    /// Strict variant of [`SimpleManager::fire`]: panics on error.
    pub fn must_fire(&self, name: &str, args: Vec<Value>) -> SimpleEvent {
        match self.fire(name, args) {
            Ok(event) => event,
            Err(err) => panic!("evbus: {err}"),
        }
    }

    fn call_handlers(event: &mut SimpleEvent, handlers: &[Handler]) -> EventResult<()> {
        for handler in handlers {
            handler(event)?;
            if event.is_aborted() {
                break;
            }
        }
        Ok(())
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }

    /// Drop the handlers for one name; returns whether any existed.
    pub fn clear_handlers(&mut self, name: &str) -> bool {
        self.handlers.remove(name).is_some()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_fire_passes_positional_args() {
        let mut manager = SimpleManager::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = Arc::clone(&seen);
        manager
            .on("user.created", move |event| {
                inner.lock().unwrap().push(event.arg(0).cloned());
                Ok(())
            })
            .unwrap();

        manager
            .fire("user.created", vec![json!("alice"), json!(7)])
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![Some(json!("alice"))]);
    }

    #[test]
    fn test_catchall_runs_after_exact_handlers() {
        let mut manager = SimpleManager::new();
        let buffer = Arc::new(Mutex::new(String::new()));

        let exact = Arc::clone(&buffer);
        manager
            .on("e1", move |_| {
                exact.lock().unwrap().push('E');
                Ok(())
            })
            .unwrap();
        let all = Arc::clone(&buffer);
        manager
            .on("*", move |_| {
                all.lock().unwrap().push('G');
                Ok(())
            })
            .unwrap();

        manager.fire("e1", Vec::new()).unwrap();
        assert_eq!(*buffer.lock().unwrap(), "EG");

        // unknown name fires only the catch-all
        manager.fire("unknown", Vec::new()).unwrap();
        assert_eq!(*buffer.lock().unwrap(), "EGG");
    }

    #[test]
    fn test_abort_stops_the_chain() {
        let mut manager = SimpleManager::new();
        let buffer = Arc::new(Mutex::new(String::new()));

        manager
            .on("e1", |event| {
                event.abort();
                Ok(())
            })
            .unwrap();
        let late = Arc::clone(&buffer);
        manager
            .on("e1", move |_| {
                late.lock().unwrap().push('L');
                Ok(())
            })
            .unwrap();
        let all = Arc::clone(&buffer);
        manager
            .on("*", move |_| {
                all.lock().unwrap().push('G');
                Ok(())
            })
            .unwrap();

        let event = manager.fire("e1", Vec::new()).unwrap();
        assert!(event.is_aborted());
        assert_eq!(*buffer.lock().unwrap(), "");
    }

    #[test]
    fn test_error_stops_the_chain() {
        let mut manager = SimpleManager::new();
        manager
            .on("e1", |_| Err(EventError::listener("bad handler")))
            .unwrap();

        assert!(manager.fire("e1", Vec::new()).is_err());
    }

    #[test]
    fn test_registry_queries_and_clear() {
        let mut manager = SimpleManager::new();
        manager.on("e1", |_| Ok(())).unwrap();
        manager.on("e1", |_| Ok(())).unwrap();

        assert!(manager.has_event("e1"));
        assert_eq!(manager.handler_count("e1"), 2);
        assert_eq!(manager.handler_count("other"), 0);

        assert!(manager.clear_handlers("e1"));
        assert!(!manager.has_event("e1"));

        manager.on("e2", |_| Ok(())).unwrap();
        manager.clear();
        assert!(!manager.has_event("e2"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut manager = SimpleManager::new();
        assert!(manager.on("  ", |_| Ok(())).is_err());
    }
}
