//! Core utilities shared across the dispatch engine

pub mod name;
pub mod priority;
pub mod sync;
