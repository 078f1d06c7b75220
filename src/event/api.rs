//! Public API for the event payload
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::event::cancel::CancelToken;
pub use crate::event::event::{Event, EventData};
