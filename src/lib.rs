//! evbus - in-process event dispatch
//!
//! A registry mapping event names to priority-ordered listener chains, with
//! wildcard-pattern group routing, a synchronous fire cascade with abort/error
//! short-circuit, and an optional asynchronous delivery path backed by a
//! bounded worker pool.
//!
//! External code should import from the per-subsystem `api` modules:
//! `bus::api` for the manager and listener types, `event::api` for the
//! event payload, `simple` for the positional-argument lite variant.

pub mod bus;
pub mod core;
pub mod event;
pub mod simple;
