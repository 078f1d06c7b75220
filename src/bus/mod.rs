//! Event Bus Component
//!
//! The listener registry and its dispatch algorithm: priority-ordered
//! listener queues, two name-matching modes, the synchronous fire cascade
//! (direct, group, then global listeners) with abort/error short-circuit,
//! and the asynchronous fire subsystem (bounded worker pool with graceful
//! drain, plus spawn-per-event and fire-and-await).
//!
//! # Overview
//!
//! Producers fire named events; consumers register listeners against
//! patterns. The [`manager::EventManager`] resolves the queues matching a
//! fired name under its match mode, sorts each queue by priority, and
//! invokes the listeners in order. An error or abort from any listener
//! stops the whole fire.
//!
//! ```text
//!   fire("app.user.add")
//!        │
//!        ▼                        Simple mode
//!   ┌──────────────┐   exact      ┌────────────────┐
//!   │ EventManager │ ───────────▶ │ "app.user.add" │  priority order
//!   │   registry   │   group      ├────────────────┤
//!   │              │ ───────────▶ │ "app.user.*"   │  priority order
//!   │              │   catch-all  ├────────────────┤
//!   │              │ ───────────▶ │ "*"            │  priority order
//!   └──────────────┘              └────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use evbus::bus::api::{EventManager, priority};
//! use evbus::event::api::EventData;
//!
//! # fn example() -> Result<(), evbus::bus::api::EventError> {
//! let bus = EventManager::new("app");
//! bus.on_fn_with("app.user.*", |event| {
//!     println!("user event: {}", event.name());
//!     Ok(())
//! }, priority::HIGH)?;
//!
//! let event = bus.fire("app.user.add", EventData::new())?;
//! assert!(!event.is_aborted());
//! # Ok(())
//! # }
//! ```

// Internal modules - all access should go through api module
pub(crate) mod error;
pub(crate) mod listener;
pub(crate) mod manager;
pub(crate) mod pool;
pub(crate) mod queue;
pub(crate) mod subscriber;

// Public API module - the only public interface for the bus
pub mod api;
