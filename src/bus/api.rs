//! Public API for the event bus
//!
//! This module provides the complete public API for the dispatch engine,
//! plus the process-wide default manager. External modules should import
//! from here rather than directly from internal modules.

use std::sync::{Arc, LazyLock};

// Manager and configuration
pub use crate::bus::manager::{EventFactory, EventManager, FireItem, ManagerOptions};

// Listener types and handles
pub use crate::bus::listener::{Listener, ListenerFn, ListenerId, OnceListener};
pub use crate::bus::queue::{ListenerItem, ListenerQueue};
pub use crate::bus::subscriber::{Subscriber, Subscription};

// Error handling
pub use crate::bus::error::{EventError, EventResult};

// Matching modes and priority levels
pub use crate::core::name::MatchMode;
pub use crate::core::priority;

use crate::event::event::{Event, EventData};

/// Process-wide default manager, created on first use.
static DEFAULT_BUS: LazyLock<Arc<EventManager>> = LazyLock::new(|| {
    log::trace!("Initializing default event bus");
    Arc::new(EventManager::new("default"))
});

/// Access the default manager shared by the free-function façade.
///
/// Each call returns the same instance; hold the `Arc` for async fire
/// methods that need shared ownership.
pub fn default_bus() -> &'static Arc<EventManager> {
    &DEFAULT_BUS
}

/// Register a listener on the default manager.
pub fn on(name: &str, listener: Arc<dyn Listener>, priority: i32) -> EventResult<ListenerId> {
    default_bus().on(name, listener, priority)
}

/// Register a closure on the default manager with normal priority.
pub fn on_fn<F>(name: &str, func: F) -> EventResult<ListenerId>
where
    F: Fn(&mut Event) -> EventResult<()> + Send + Sync + 'static,
{
    default_bus().on_fn(name, func)
}

/// Register a one-shot listener on the default manager.
pub fn on_once(name: &str, listener: Arc<dyn Listener>, priority: i32) -> EventResult<ListenerId> {
    default_bus().on_once(name, listener, priority)
}

/// Register a one-shot closure on the default manager with normal priority.
pub fn on_once_fn<F>(name: &str, func: F) -> EventResult<ListenerId>
where
    F: Fn(&mut Event) -> EventResult<()> + Send + Sync + 'static,
{
    default_bus().on_once_fn(name, func)
}

/// Register a pre-defined event prototype on the default manager.
pub fn add_event(event: Event) -> EventResult<()> {
    default_bus().add_event(event)
}

/// Register a pre-defined event factory on the default manager.
pub fn add_event_factory<F>(name: &str, factory: F) -> EventResult<()>
where
    F: Fn() -> Event + Send + Sync + 'static,
{
    default_bus().add_event_factory(name, factory)
}

/// Build an instance of a pre-defined event from the default manager.
pub fn get_event(name: &str) -> Option<Event> {
    default_bus().get_event(name)
}

/// Whether the default manager has a pre-defined event under this name.
pub fn has_event(name: &str) -> bool {
    default_bus().has_event(name)
}

/// Register every subscription a subscriber declares on the default manager.
pub fn subscribe(subscriber: &dyn Subscriber) -> EventResult<Vec<ListenerId>> {
    default_bus().subscribe(subscriber)
}

/// Fire an event by name on the default manager.
pub fn fire(name: &str, data: EventData) -> EventResult<Event> {
    default_bus().fire(name, data)
}

/// Strict fire on the default manager: panics on error.
pub fn must_fire(name: &str, data: EventData) -> Event {
    default_bus().must_fire(name, data)
}

/// Fire a prebuilt event on the default manager.
pub fn fire_event(event: &mut Event) -> EventResult<()> {
    default_bus().fire_event(event)
}

/// Fire several names or events on the default manager.
pub fn fire_batch<I>(items: I) -> Vec<EventError>
where
    I: IntoIterator,
    I::Item: Into<FireItem>,
{
    default_bus().fire_batch(items)
}

/// Enqueue an event on the default manager's bounded async queue.
pub fn fire_async(event: Event) -> EventResult<()> {
    default_bus().fire_async(event)
}

/// Validate, build and enqueue an event on the bounded async queue.
pub fn fire_bounded(name: &str, data: EventData) -> EventResult<()> {
    default_bus().fire_bounded(name, data)
}

/// Fire on a detached thread via the default manager; result discarded.
pub fn spawn_fire(event: Event) {
    default_bus().spawn_fire(event)
}

/// Fire on a spawned thread and block for the result.
pub fn await_fire(event: Event) -> EventResult<Event> {
    default_bus().await_fire(event)
}

/// Whether the default manager has listeners under exactly this pattern.
pub fn has_listeners(name: &str) -> bool {
    default_bus().has_listeners(name)
}

/// Listener count under exactly this pattern on the default manager.
pub fn listener_count(name: &str) -> usize {
    default_bus().listener_count(name)
}

/// Close the default manager's async queue and wait for the drain.
pub fn close_wait() -> EventResult<()> {
    default_bus().close_wait()
}

/// Explicit teardown for the default manager: drops every listener and
/// pre-defined event and forgets the last async error. The async pool,
/// once closed, stays
/// closed; tests that exercise it should build their own manager.
pub fn reset() {
    default_bus().clear()
}
