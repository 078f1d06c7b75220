//! Synchronization utilities for robust lock handling
//!
//! Converts lock poisoning into application errors instead of panicking,
//! so a panic inside one listener cannot take the whole bus down with it.

use std::sync::LockResult;

/// Handle poisoned lock cases with consistent error handling
///
/// Converts a poison error from any `Mutex`/`RwLock` acquisition into an
/// application-specific error using the provided constructor. A poisoned
/// lock means a panic occurred while the lock was held.
pub fn handle_lock_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "internal synchronisation error (lock poisoned): {:?}",
            poison_err
        ))
    })
}
