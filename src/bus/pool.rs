//! Asynchronous delivery: bounded worker pool and spawn-per-event
//!
//! Two independent mechanisms layered on the synchronous fire:
//!
//! - **Bounded queue**: a crossbeam bounded channel drained by a fixed set
//!   of worker threads, lazily created on first use. Sending blocks while
//!   the channel is full - true backpressure. Each worker fires events
//!   start-to-finish; a failed fire, including a panicking listener, is
//!   recorded as the manager's last async error without stopping the
//!   worker. [`EventManager::close`]
//!   drops the sender so workers drain and exit; [`EventManager::wait`]
//!   joins them and surfaces the recorded failure.
//! - **Spawn-per-event**: one detached thread per event, no backpressure
//!   or ordering; [`EventManager::await_fire`] funnels the single result
//!   back through a one-shot channel.
//!
//! Workers hold only a `Weak` manager reference, so an abandoned manager
//! is not kept alive by its own pool.

use crate::bus::error::{EventError, EventResult};
use crate::bus::manager::EventManager;
use crate::core::name::validate_name;
use crate::core::sync::handle_lock_poison;
use crate::event::event::{Event, EventData};
use crossbeam_channel::{bounded, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

/// Listener error carrying whatever message a panic payload holds.
fn panic_error(payload: Box<dyn std::any::Any + Send>) -> EventError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    EventError::Listener(format!("listener panicked: {message}"))
}

/// Channel and workers backing the bounded async path.
pub(crate) struct PoolState {
    /// `None` once closed; workers exit when every sender is gone.
    sender: Option<Sender<Event>>,
    workers: Vec<JoinHandle<()>>,
}

impl EventManager {
    /// Enqueue an event on the bounded async queue (fire-and-forget).
    ///
    /// Lazily creates the channel and worker pool on first call. Blocks
    /// while the queue is full. The fire result is observable only as the
    /// manager's last async error via [`EventManager::wait`].
    pub fn fire_async(self: &Arc<Self>, event: Event) -> EventResult<()> {
        let sender = self.ensure_pool()?;
        log::trace!("bus '{}': queueing '{}' for async fire", self.name(), event.name());
        sender.send(event).map_err(|_| EventError::Closed)
    }

    /// Validate a name, build the event (honoring pre-defined events) and
    /// enqueue it on the bounded queue.
    pub fn fire_bounded(self: &Arc<Self>, name: &str, data: EventData) -> EventResult<()> {
        let name = validate_name(name)?;
        let event = self.build_event(name, data);
        self.fire_async(event)
    }

    /// Fire an event on a detached thread; the result is discarded.
    pub fn spawn_fire(self: &Arc<Self>, event: Event) {
        let manager = Arc::clone(self);
        std::thread::spawn(move || {
            let mut event = event;
            if let Err(err) = manager.fire_event(&mut event) {
                log::debug!(
                    "bus '{}': spawned fire of '{}' failed: {}",
                    manager.name(),
                    event.name(),
                    err
                );
            }
        });
    }

    /// Fire an event on a spawned thread and block until it completes,
    /// returning the mutated event or the dispatch error.
    pub fn await_fire(self: &Arc<Self>, event: Event) -> EventResult<Event> {
        let (result_tx, result_rx) = bounded(1);
        let manager = Arc::clone(self);
        std::thread::spawn(move || {
            let mut event = event;
            let result = manager.fire_event(&mut event);
            let _ = result_tx.send((event, result));
        });

        match result_rx.recv() {
            Ok((event, Ok(()))) => Ok(event),
            Ok((_, Err(err))) => Err(err),
            // The spawned thread can only vanish without sending if a
            // listener panicked through the fire.
            Err(_) => Err(EventError::listener("awaited fire terminated abnormally")),
        }
    }

    /// Close the bounded queue: no further sends are accepted, workers
    /// drain the remaining events and then exit. A pool that was never
    /// started closes trivially.
    pub fn close(&self) -> EventResult<()> {
        let mut pool = handle_lock_poison(self.pool.lock(), EventError::Lock)?;
        if let Some(state) = pool.as_mut() {
            state.sender = None;
            log::debug!("bus '{}': async queue closed, draining", self.name());
        }
        Ok(())
    }

    /// Block until every worker has exited, then return the last failure
    /// recovered inside the pool, if any.
    ///
    /// Call [`EventManager::close`] first; waiting on an open pool blocks
    /// until some other thread closes it.
    pub fn wait(&self) -> EventResult<()> {
        let workers = {
            let mut pool = handle_lock_poison(self.pool.lock(), EventError::Lock)?;
            match pool.as_mut() {
                Some(state) => std::mem::take(&mut state.workers),
                None => Vec::new(),
            }
        };
        for worker in workers {
            let _ = worker.join();
        }

        let slot = handle_lock_poison(self.last_async_error.lock(), EventError::Lock)?;
        match slot.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Close the queue and wait for the drain in one call.
    pub fn close_wait(&self) -> EventResult<()> {
        self.close()?;
        self.wait()
    }

    /// Get the live sender, creating channel and workers on first use.
    fn ensure_pool(self: &Arc<Self>) -> EventResult<Sender<Event>> {
        let mut pool = handle_lock_poison(self.pool.lock(), EventError::Lock)?;
        if let Some(state) = pool.as_ref() {
            return match &state.sender {
                Some(sender) => Ok(sender.clone()),
                None => Err(EventError::Closed),
            };
        }

        let capacity = self.options.channel_size.max(1);
        let consumers = self.options.consumer_count.max(1);
        let (sender, receiver) = bounded::<Event>(capacity);

        let mut workers = Vec::with_capacity(consumers);
        for index in 0..consumers {
            let receiver = receiver.clone();
            let manager: Weak<EventManager> = Arc::downgrade(self);
            workers.push(std::thread::spawn(move || {
                // keep running until the channel is closed and drained
                for mut event in receiver.iter() {
                    let Some(manager) = manager.upgrade() else { break };
                    // contain listener panics so one bad handler cannot
                    // shrink the pool
                    let result = catch_unwind(AssertUnwindSafe(|| manager.fire_event(&mut event)))
                        .unwrap_or_else(|payload| Err(panic_error(payload)));
                    if let Err(err) = result {
                        log::warn!(
                            "bus '{}': worker {} failed firing '{}': {}",
                            manager.name(),
                            index,
                            event.name(),
                            err
                        );
                        if let Ok(mut slot) = manager.last_async_error.lock() {
                            *slot = Some(err);
                        }
                    }
                }
            }));
        }
        log::debug!(
            "bus '{}': async pool started ({} workers, capacity {})",
            self.name(),
            consumers,
            capacity
        );

        *pool = Some(PoolState {
            sender: Some(sender.clone()),
            workers,
        });
        Ok(sender)
    }
}
