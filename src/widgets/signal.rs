//! Single-threaded signals with disconnectable connections.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Ordered list of entries that can be removed by connection id.
pub(crate) struct SlotList<T> {
    entries: RefCell<Vec<(u64, T)>>,
    next_id: Cell<u64>,
}

impl<T: Clone> SlotList<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub(crate) fn insert(&self, value: T) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, value));
        id
    }

    /// Copy of the current entries; callers iterate this so that slots may
    /// connect or disconnect while running.
    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.entries.borrow().iter().map(|(_, v)| v.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

pub(crate) trait Disconnect {
    fn remove(&self, id: u64) -> bool;
}

impl<T> Disconnect for SlotList<T> {
    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }
}

/// Handle to one connected slot. Dropping it leaves the slot connected.
#[must_use = "a dropped connection can no longer be disconnected"]
pub struct Connection {
    list: Weak<dyn Disconnect>,
    id: u64,
}

impl Connection {
    pub(crate) fn new(list: Weak<dyn Disconnect>, id: u64) -> Self {
        Self { list, id }
    }

    /// Returns false if the slot was already gone.
    pub fn disconnect(self) -> bool {
        self.list.upgrade().is_some_and(|list| list.remove(self.id))
    }
}

type Slot<A> = Rc<dyn Fn(&A)>;

pub struct Signal<A: 'static> {
    slots: Rc<SlotList<Slot<A>>>,
}

impl<A: 'static> Default for Signal<A> {
    fn default() -> Self {
        Self {
            slots: Rc::new(SlotList::new()),
        }
    }
}

impl<A: 'static> Signal<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, slot: impl Fn(&A) + 'static) -> Connection {
        let id = self.slots.insert(Rc::new(slot));
        let list: Rc<dyn Disconnect> = self.slots.clone();
        Connection::new(Rc::downgrade(&list), id)
    }

    /// Calls every slot connected when emission starts, in connection order.
    pub fn emit(&self, arg: &A) {
        for slot in self.slots.snapshot() {
            slot(arg);
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/signal.rs"]
mod tests;
