//! Listener trait and identity handles
//!
//! A listener is registered as an `Arc<dyn Listener>`; the `Arc` is the
//! stable reference that makes identity well-defined. Two identities exist
//! for removal:
//!
//! - the [`ListenerId`] handle returned at registration, which names exactly
//!   one registration;
//! - the `Arc` allocation itself, compared by pointer. Removing by reference
//!   removes **every** registration sharing the allocation - registering one
//!   `Arc` twice and removing by reference once removes both copies.
//!   Distinct closures with identical captured data never compare equal.

use crate::bus::error::EventResult;
use crate::event::event::Event;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Unit of work invoked during dispatch.
///
/// The handler reads and writes the event's data bag, may set the abort
/// flag, and returns `Ok` to continue the chain or an error to stop the
/// entire fire.
pub trait Listener: Send + Sync {
    fn handle(&self, event: &mut Event) -> EventResult<()>;
}

/// Closure adapter implementing [`Listener`].
pub struct ListenerFn<F>(F);

impl<F> ListenerFn<F>
where
    F: Fn(&mut Event) -> EventResult<()> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self(func)
    }
}

impl<F> Listener for ListenerFn<F>
where
    F: Fn(&mut Event) -> EventResult<()> + Send + Sync,
{
    fn handle(&self, event: &mut Event) -> EventResult<()> {
        (self.0)(event)
    }
}

/// One-shot wrapper: delegates to the inner listener on the first
/// invocation only, every later call is a silent no-op.
///
/// The registration itself stays in its queue until removed like any
/// other; only the invocation is guarded.
pub struct OnceListener {
    inner: Arc<dyn Listener>,
    fired: AtomicBool,
}

impl OnceListener {
    pub fn new(inner: Arc<dyn Listener>) -> Self {
        Self {
            inner,
            fired: AtomicBool::new(false),
        }
    }
}

impl Listener for OnceListener {
    fn handle(&self, event: &mut Event) -> EventResult<()> {
        if self.fired.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.inner.handle(event)
    }
}

/// Opaque handle naming one registration, used for precise removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

impl ListenerId {
    pub(crate) fn next() -> Self {
        ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}
