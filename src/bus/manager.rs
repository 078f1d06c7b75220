//! EventManager - listener registry and synchronous dispatch
//!
//! The manager owns every [`ListenerQueue`] keyed by pattern, the match
//! mode, and the async configuration. It is the sole mutator of the
//! registry.
//!
//! # Thread Safety
//!
//! The registry sits behind an `RwLock`, so registration and fire are
//! memory-safe from any thread. The `serialize_fire` option additionally
//! puts the whole fire path behind one mutex for callers that need
//! fire-vs-fire exclusion. Matching queues are sorted and snapshotted under
//! the registry lock, then listeners run with the lock released: a listener
//! may register or fire re-entrantly without deadlocking, and mid-fire
//! registration never affects the fire already in flight.

use crate::bus::error::{EventError, EventResult};
use crate::bus::listener::{Listener, ListenerFn, ListenerId, OnceListener};
use crate::bus::pool::PoolState;
use crate::bus::queue::{ListenerItem, ListenerQueue};
use crate::bus::subscriber::Subscriber;
use crate::core::name::{
    group_pattern, match_node_path, validate_name, validate_pattern, MatchMode, WILDCARD,
};
use crate::core::priority;
use crate::core::sync::handle_lock_poison;
use crate::event::event::{Event, EventData};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

/// Tuning knobs fixed at manager construction.
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Name matching mode for the whole manager
    pub match_mode: MatchMode,
    /// Bounded async queue capacity
    pub channel_size: usize,
    /// Worker count for the bounded async queue
    pub consumer_count: usize,
    /// Serialize the fire path behind a single mutex
    pub serialize_fire: bool,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Simple,
            channel_size: 100,
            consumer_count: 3,
            serialize_fire: false,
        }
    }
}

/// Builds a fresh instance of a pre-defined event per fire.
pub type EventFactory = Box<dyn Fn() -> Event + Send + Sync>;

/// Name or prebuilt event accepted by [`EventManager::fire_batch`].
pub enum FireItem {
    Name(String),
    Event(Event),
}

impl From<&str> for FireItem {
    fn from(name: &str) -> Self {
        FireItem::Name(name.to_string())
    }
}

impl From<String> for FireItem {
    fn from(name: String) -> Self {
        FireItem::Name(name)
    }
}

impl From<Event> for FireItem {
    fn from(event: Event) -> Self {
        FireItem::Event(event)
    }
}

/// Event manager: registry, dispatch and async lifecycle.
pub struct EventManager {
    name: String,
    pub(crate) options: ManagerOptions,
    registry: RwLock<HashMap<String, ListenerQueue>>,
    /// Pre-defined event definitions consulted by name-based fires.
    factories: RwLock<HashMap<String, EventFactory>>,
    fire_lock: Mutex<()>,
    /// Lazily created bounded channel + workers; see `bus::pool`.
    pub(crate) pool: Mutex<Option<PoolState>>,
    /// Most recent failure recovered inside a pool worker.
    pub(crate) last_async_error: Mutex<Option<EventError>>,
}

impl EventManager {
    /// Manager with default options (Simple mode, capacity 100, 3 workers).
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, ManagerOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: ManagerOptions) -> Self {
        Self {
            name: name.into(),
            options,
            registry: RwLock::new(HashMap::new()),
            factories: RwLock::new(HashMap::new()),
            fire_lock: Mutex::new(()),
            pool: Mutex::new(None),
            last_async_error: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    // region Registration

    /// Register a listener for a pattern with the given priority.
    ///
    /// The queue for the pattern is created on first registration. Returns
    /// the handle naming this registration for later removal.
    pub fn on(
        &self,
        name: &str,
        listener: std::sync::Arc<dyn Listener>,
        priority: i32,
    ) -> EventResult<ListenerId> {
        let pattern = validate_pattern(name)?;
        let mut registry = handle_lock_poison(self.registry.write(), EventError::Lock)?;
        let queue = registry.entry(pattern.clone()).or_default();
        let id = queue.push(listener, priority);
        log::trace!(
            "bus '{}': registered listener on '{}' (priority {}, {} total)",
            self.name,
            pattern,
            priority,
            queue.len()
        );
        Ok(id)
    }

    /// Register a closure with normal priority.
    pub fn on_fn<F>(&self, name: &str, func: F) -> EventResult<ListenerId>
    where
        F: Fn(&mut Event) -> EventResult<()> + Send + Sync + 'static,
    {
        self.on_fn_with(name, func, priority::NORMAL)
    }

    /// Register a closure with an explicit priority.
    pub fn on_fn_with<F>(&self, name: &str, func: F, priority: i32) -> EventResult<ListenerId>
    where
        F: Fn(&mut Event) -> EventResult<()> + Send + Sync + 'static,
    {
        self.on(name, std::sync::Arc::new(ListenerFn::new(func)), priority)
    }

    /// Register a one-shot listener: it runs on the first matching fire
    /// only, later fires skip it silently. The registration stays in its
    /// queue until removed via the returned handle.
    pub fn on_once(
        &self,
        name: &str,
        listener: std::sync::Arc<dyn Listener>,
        priority: i32,
    ) -> EventResult<ListenerId> {
        self.on(
            name,
            std::sync::Arc::new(OnceListener::new(listener)),
            priority,
        )
    }

    /// Register a one-shot closure with normal priority.
    pub fn on_once_fn<F>(&self, name: &str, func: F) -> EventResult<ListenerId>
    where
        F: Fn(&mut Event) -> EventResult<()> + Send + Sync + 'static,
    {
        self.on_once(
            name,
            std::sync::Arc::new(ListenerFn::new(func)),
            priority::NORMAL,
        )
    }

    /// Strict variant of [`EventManager::on`]: panics on a bad pattern.
    pub fn must_on(
        &self,
        name: &str,
        listener: std::sync::Arc<dyn Listener>,
        priority: i32,
    ) -> ListenerId {
        match self.on(name, listener, priority) {
            Ok(id) => id,
            Err(err) => panic!("evbus: {err}"),
        }
    }

    /// Register every subscription a subscriber declares.
    pub fn subscribe(&self, subscriber: &dyn Subscriber) -> EventResult<Vec<ListenerId>> {
        let mut ids = Vec::new();
        for subscription in subscriber.subscriptions() {
            ids.push(self.on(
                &subscription.name,
                subscription.listener,
                subscription.priority,
            )?);
        }
        Ok(ids)
    }

    // endregion

    // region Pre-defined events

    /// Register the event as a prototype under its own name.
    ///
    /// Name-based fires of that name start from a clone of the prototype
    /// instead of a blank event.
    pub fn add_event(&self, event: Event) -> EventResult<()> {
        let name = validate_name(event.name())?;
        self.add_event_factory(&name, move || event.clone())
    }

    /// Register a factory producing a fresh event instance per fire.
    pub fn add_event_factory<F>(&self, name: &str, factory: F) -> EventResult<()>
    where
        F: Fn() -> Event + Send + Sync + 'static,
    {
        let name = validate_name(name)?;
        let mut factories = handle_lock_poison(self.factories.write(), EventError::Lock)?;
        factories.insert(name, Box::new(factory));
        Ok(())
    }

    /// Build an instance of the pre-defined event, if one is registered.
    pub fn get_event(&self, name: &str) -> Option<Event> {
        self.factories
            .read()
            .ok()
            .and_then(|factories| factories.get(name).map(|factory| factory()))
    }

    /// Whether a pre-defined event exists under this name.
    pub fn has_event(&self, name: &str) -> bool {
        self.factories
            .read()
            .map(|factories| factories.contains_key(name))
            .unwrap_or(false)
    }

    /// Drop one pre-defined event; returns whether it existed.
    pub fn remove_event(&self, name: &str) -> bool {
        self.factories
            .write()
            .map(|mut factories| factories.remove(name).is_some())
            .unwrap_or(false)
    }

    /// Drop every pre-defined event.
    pub fn remove_events(&self) {
        if let Ok(mut factories) = self.factories.write() {
            factories.clear();
        }
    }

    /// Event for a validated fired name: an instance of the pre-defined
    /// event when one exists (a non-empty bag replaces its data), a blank
    /// event otherwise.
    pub(crate) fn build_event(&self, name: String, data: EventData) -> Event {
        match self.get_event(&name) {
            Some(mut event) => {
                if !data.is_empty() {
                    event.set_data(data);
                }
                event
            }
            None => Event::with_data(name, data),
        }
    }

    // endregion

    // region Removal and queries

    /// Remove the registration named by the handle. Emptied queues are
    /// deleted. Removing an unknown handle is a silent no-op.
    pub fn remove(&self, name: &str, id: ListenerId) -> EventResult<usize> {
        let mut registry = handle_lock_poison(self.registry.write(), EventError::Lock)?;
        let mut removed = 0;
        if let Some(queue) = registry.get_mut(name) {
            removed = queue.remove_by_id(id);
            if queue.is_empty() {
                registry.remove(name);
            }
        }
        Ok(removed)
    }

    /// Remove every registration sharing the listener's allocation.
    ///
    /// An empty name searches every queue. Intentionally multi-remove:
    /// the same listener registered twice under one pattern is removed
    /// twice by a single call.
    pub fn remove_by_ref(
        &self,
        name: &str,
        listener: &std::sync::Arc<dyn Listener>,
    ) -> EventResult<usize> {
        let mut registry = handle_lock_poison(self.registry.write(), EventError::Lock)?;
        let mut removed = 0;
        if name.is_empty() {
            for queue in registry.values_mut() {
                removed += queue.remove_by_ref(listener);
            }
        } else if let Some(queue) = registry.get_mut(name) {
            removed = queue.remove_by_ref(listener);
        }
        registry.retain(|_, queue| !queue.is_empty());
        Ok(removed)
    }

    /// Drop the whole queue for a pattern.
    pub fn remove_all(&self, name: &str) -> EventResult<bool> {
        let mut registry = handle_lock_poison(self.registry.write(), EventError::Lock)?;
        Ok(registry.remove(name).is_some())
    }

    /// Remove all listeners and pre-defined events, and forget the last
    /// async error.
    pub fn clear(&self) {
        if let Ok(mut registry) = self.registry.write() {
            registry.clear();
        }
        self.remove_events();
        if let Ok(mut slot) = self.last_async_error.lock() {
            *slot = None;
        }
        log::debug!("bus '{}': cleared", self.name);
    }

    /// Whether any listener is registered under exactly this pattern.
    pub fn has_listeners(&self, name: &str) -> bool {
        self.registry
            .read()
            .map(|registry| registry.contains_key(name))
            .unwrap_or(false)
    }

    /// Listener count under exactly this pattern.
    pub fn listener_count(&self, name: &str) -> usize {
        self.registry
            .read()
            .map(|registry| registry.get(name).map_or(0, ListenerQueue::len))
            .unwrap_or(0)
    }

    /// Every pattern with at least one listener.
    pub fn listened_names(&self) -> Vec<String> {
        self.registry
            .read()
            .map(|registry| registry.keys().cloned().collect())
            .unwrap_or_default()
    }

    // endregion

    // region Synchronous fire

    /// Fire an event by name with the given data bag.
    ///
    /// A pre-defined event registered under the name is used as the
    /// starting instance; a non-empty bag replaces its data.
    /// Zero matching listeners is not an error: the built event is
    /// returned untouched with `Ok`. Callers distinguish "no listeners"
    /// only via [`EventManager::listener_count`].
    pub fn fire(&self, name: &str, data: EventData) -> EventResult<Event> {
        let name = validate_name(name)?;
        let mut event = self.build_event(name, data);
        self.fire_event(&mut event)?;
        Ok(event)
    }

    /// Strict variant of [`EventManager::fire`]: panics on error.
    pub fn must_fire(&self, name: &str, data: EventData) -> Event {
        match self.fire(name, data) {
            Ok(event) => event,
            Err(err) => panic!("evbus: {err}"),
        }
    }

    /// Fire a prebuilt event instance.
    ///
    /// Resets the abort flag, resolves the matching queues for the
    /// manager's mode, and invokes them in priority order. The first
    /// listener error stops the entire dispatch and is returned verbatim;
    /// an abort stops the dispatch silently. A cancelled token on the
    /// event overrides both.
    pub fn fire_event(&self, event: &mut Event) -> EventResult<()> {
        let _guard = if self.options.serialize_fire {
            Some(handle_lock_poison(self.fire_lock.lock(), EventError::Lock)?)
        } else {
            None
        };

        event.abort(false);
        let token = event.cancel_token().cloned();
        let stages = self.matching_stages(event.name())?;
        log::trace!(
            "bus '{}': firing '{}' across {} queue(s)",
            self.name,
            event.name(),
            stages.len()
        );

        for items in stages {
            for item in items {
                if let Some(token) = &token {
                    token.check(event.name())?;
                }
                item.listener.handle(event)?;
                if event.is_aborted() {
                    log::trace!("bus '{}': '{}' aborted by listener", self.name, event.name());
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Fire several names or prebuilt events, collecting the failures.
    pub fn fire_batch<I>(&self, items: I) -> Vec<EventError>
    where
        I: IntoIterator,
        I::Item: Into<FireItem>,
    {
        let mut errors = Vec::new();
        for item in items {
            let result = match item.into() {
                FireItem::Name(name) => self.fire(&name, EventData::new()).map(|_| ()),
                FireItem::Event(mut event) => self.fire_event(&mut event),
            };
            if let Err(err) = result {
                errors.push(err);
            }
        }
        errors
    }

    /// Resolve, sort and snapshot the queues matching a fired name.
    ///
    /// Simple mode yields up to three stages in fixed order (exact, then
    /// trailing group, then catch-all). Path mode yields one stage per
    /// matching pattern in unspecified cross-pattern order. Lazy sorting
    /// mutates the queues, hence the write lock; the snapshots are cheap
    /// `Arc` clones.
    fn matching_stages(&self, name: &str) -> EventResult<Vec<Vec<ListenerItem>>> {
        let mut registry = handle_lock_poison(self.registry.write(), EventError::Lock)?;
        let mut stages = Vec::new();

        match self.options.match_mode {
            MatchMode::Simple => {
                if let Some(queue) = registry.get_mut(name) {
                    stages.push(queue.sort().items().to_vec());
                }
                if let Some(group) = group_pattern(name) {
                    if let Some(queue) = registry.get_mut(&group) {
                        stages.push(queue.sort().items().to_vec());
                    }
                }
                if name != WILDCARD {
                    if let Some(queue) = registry.get_mut(WILDCARD) {
                        stages.push(queue.sort().items().to_vec());
                    }
                }
            }
            MatchMode::Path => {
                for (pattern, queue) in registry.iter_mut() {
                    if pattern.as_str() == name || match_node_path(pattern, name) {
                        stages.push(queue.sort().items().to_vec());
                    }
                }
            }
        }
        Ok(stages)
    }

    // endregion
}
