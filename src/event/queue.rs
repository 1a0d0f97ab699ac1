use std::collections::VecDeque;
use std::time::Instant;

use crate::sync::{Condition, Lock};

/// Unbounded multi-producer FIFO.
///
/// Items from any single producer come out in the order that producer put
/// them; across producers the order is arrival order at `put`.
pub struct EventQueue<T> {
    items: Lock<VecDeque<T>>,
    available: Condition,
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Lock::new(VecDeque::new()),
            available: Condition::new(),
        }
    }

    pub fn put(&self, item: T) {
        self.items.acquire().push_back(item);
        self.available.wake_one();
    }

    /// Blocks until an item is available.
    pub fn get(&self) -> T {
        let mut items = self
            .available
            .wait_while(self.items.acquire(), |items| items.is_empty());
        match items.pop_front() {
            Some(item) => item,
            None => unreachable!("queue emptied while held"),
        }
    }

    pub fn get_until(&self, deadline: Instant) -> Option<T> {
        let (mut items, _) =
            self.available
                .wait_while_until(self.items.acquire(), deadline, |items| items.is_empty());
        items.pop_front()
    }

    pub fn try_get(&self) -> Option<T> {
        self.items.acquire().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.acquire().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.acquire().is_empty()
    }

    /// Drops every queued item, returning how many there were.
    pub fn clear(&self) -> usize {
        let drained: Vec<T> = self.items.acquire().drain(..).collect();
        drained.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/event/queue.rs"]
mod tests;
