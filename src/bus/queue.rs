//! Per-pattern listener queue with lazy priority ordering
//!
//! Append-only collection owned and mutated only by the manager. The queue
//! is sorted on demand before each fire: pushes mark it dirty, `sort` is a
//! no-op while clean. Stable sorting keeps insertion order for equal
//! priorities.

use crate::bus::listener::{Listener, ListenerId};
use std::sync::Arc;

/// One registration: listener plus its priority and identity handle.
#[derive(Clone)]
pub struct ListenerItem {
    pub id: ListenerId,
    pub priority: i32,
    pub listener: Arc<dyn Listener>,
}

/// Ordered listener collection for a single registered pattern.
#[derive(Default)]
pub struct ListenerQueue {
    items: Vec<ListenerItem>,
    sorted: bool,
}

impl ListenerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registration, returning its identity handle.
    pub fn push(&mut self, listener: Arc<dyn Listener>, priority: i32) -> ListenerId {
        let id = ListenerId::next();
        self.items.push(ListenerItem {
            id,
            priority,
            listener,
        });
        self.sorted = false;
        id
    }

    /// Sort by descending priority. Stable, lazy and idempotent: ties keep
    /// insertion order, and sorting an already-sorted queue is a no-op.
    pub fn sort(&mut self) -> &mut Self {
        if !self.sorted {
            self.items.sort_by(|a, b| b.priority.cmp(&a.priority));
            self.sorted = true;
        }
        self
    }

    pub fn items(&self) -> &[ListenerItem] {
        &self.items
    }

    /// Remove the registration with the given handle. Returns the number
    /// of items removed (0 or 1; handles name exactly one registration).
    pub fn remove_by_id(&mut self, id: ListenerId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before - self.items.len()
    }

    /// Remove every registration sharing the given `Arc` allocation.
    ///
    /// Intentionally multi-remove: the same listener registered twice is
    /// removed twice by a single call.
    pub fn remove_by_ref(&mut self, listener: &Arc<dyn Listener>) -> usize {
        let before = self.items.len();
        self.items
            .retain(|item| !Arc::ptr_eq(&item.listener, listener));
        before - self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.sorted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::listener::ListenerFn;
    use crate::core::priority;
    use crate::event::event::Event;

    fn noop() -> Arc<dyn Listener> {
        Arc::new(ListenerFn::new(|_: &mut Event| Ok(())))
    }

    fn priorities(queue: &ListenerQueue) -> Vec<i32> {
        queue.items().iter().map(|item| item.priority).collect()
    }

    #[test]
    fn test_sort_descending_priority() {
        let mut queue = ListenerQueue::new();
        queue.push(noop(), priority::MIN);
        queue.push(noop(), priority::HIGH);
        queue.push(noop(), priority::NORMAL);

        queue.sort();
        assert_eq!(
            priorities(&queue),
            vec![priority::HIGH, priority::NORMAL, priority::MIN]
        );
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let mut queue = ListenerQueue::new();
        let first = queue.push(noop(), priority::NORMAL);
        let second = queue.push(noop(), priority::NORMAL);
        let third = queue.push(noop(), priority::HIGH);

        queue.sort();
        let order: Vec<_> = queue.items().iter().map(|item| item.id).collect();
        assert_eq!(order, vec![third, first, second]);

        // sorting again yields the identical sequence
        queue.sort();
        let again: Vec<_> = queue.items().iter().map(|item| item.id).collect();
        assert_eq!(order, again);
    }

    #[test]
    fn test_push_after_sort_keeps_tie_order() {
        let mut queue = ListenerQueue::new();
        let first = queue.push(noop(), priority::NORMAL);
        queue.sort();
        let late = queue.push(noop(), priority::NORMAL);
        queue.sort();

        let order: Vec<_> = queue.items().iter().map(|item| item.id).collect();
        assert_eq!(order, vec![first, late]);
    }

    #[test]
    fn test_remove_by_ref_removes_duplicates() {
        let mut queue = ListenerQueue::new();
        let shared = noop();
        queue.push(shared.clone(), priority::NORMAL);
        queue.push(shared.clone(), priority::HIGH);
        queue.push(noop(), priority::NORMAL);

        assert_eq!(queue.remove_by_ref(&shared), 2);
        assert_eq!(queue.len(), 1);

        // removing a never-registered listener is a silent no-op
        assert_eq!(queue.remove_by_ref(&noop()), 0);
    }

    #[test]
    fn test_remove_by_id_is_precise() {
        let mut queue = ListenerQueue::new();
        let shared = noop();
        let first = queue.push(shared.clone(), priority::NORMAL);
        let second = queue.push(shared, priority::NORMAL);

        assert_eq!(queue.remove_by_id(first), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.items()[0].id, second);
    }
}
