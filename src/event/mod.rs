//! Event payload
//!
//! An [`Event`](event::Event) is a named bag of key/value data with an
//! abort flag and an optional attached [`CancelToken`](cancel::CancelToken).
//! Listeners read and write the data bag during dispatch; setting the abort
//! flag halts the remaining chain without reporting an error.

pub(crate) mod cancel;
pub(crate) mod event;

// Public API module - the only public interface for the event payload
pub mod api;
