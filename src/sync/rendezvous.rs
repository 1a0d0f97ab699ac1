use std::time::Instant;

use super::{Condition, Lock};

/// Single-slot handoff cell.
///
/// The slot is either empty or full. `put` blocks while it is full and `take`
/// blocks while it is empty, which makes the cell an exactly-once channel of
/// depth one.
pub struct Rendezvous<T> {
    slot: Lock<Option<T>>,
    changed: Condition,
}

impl<T> Default for Rendezvous<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Rendezvous<T> {
    pub fn new() -> Self {
        Self {
            slot: Lock::new(None),
            changed: Condition::new(),
        }
    }

    pub fn full(value: T) -> Self {
        Self {
            slot: Lock::new(Some(value)),
            changed: Condition::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.slot.acquire().is_some()
    }

    pub fn put(&self, value: T) {
        let mut slot = self
            .changed
            .wait_while(self.slot.acquire(), |slot| slot.is_some());
        *slot = Some(value);
        drop(slot);
        self.changed.wake_all();
    }

    pub fn take(&self) -> T {
        let mut slot = self
            .changed
            .wait_while(self.slot.acquire(), |slot| slot.is_none());
        let value = slot.take();
        drop(slot);
        self.changed.wake_all();
        match value {
            Some(value) => value,
            None => unreachable!("rendezvous slot emptied while held"),
        }
    }

    /// Stores `value` if the slot is empty; hands it back otherwise.
    pub fn try_put(&self, value: T) -> Result<(), T> {
        let mut slot = self.slot.acquire();
        if slot.is_some() {
            return Err(value);
        }
        *slot = Some(value);
        drop(slot);
        self.changed.wake_all();
        Ok(())
    }

    pub fn try_take(&self) -> Option<T> {
        let value = self.slot.acquire().take();
        if value.is_some() {
            self.changed.wake_all();
        }
        value
    }

    /// `put` that gives up at `deadline`, returning the value.
    pub fn put_until(&self, value: T, deadline: Instant) -> Result<(), T> {
        let (mut slot, timed_out) =
            self.changed
                .wait_while_until(self.slot.acquire(), deadline, |slot| slot.is_some());
        if timed_out {
            return Err(value);
        }
        *slot = Some(value);
        drop(slot);
        self.changed.wake_all();
        Ok(())
    }

    pub fn take_until(&self, deadline: Instant) -> Option<T> {
        let (mut slot, _) =
            self.changed
                .wait_while_until(self.slot.acquire(), deadline, |slot| slot.is_none());
        let value = slot.take();
        drop(slot);
        if value.is_some() {
            self.changed.wake_all();
        }
        value
    }

    /// Replaces the stored value with `f(&old)`, waiting until the slot is
    /// full. The slot stays full throughout; on error the old value is kept.
    pub fn update<E, F>(&self, f: F) -> Result<(), E>
    where
        F: FnOnce(&T) -> Result<T, E>,
    {
        let mut slot = self
            .changed
            .wait_while(self.slot.acquire(), |slot| slot.is_none());
        if let Some(old) = slot.as_ref() {
            let new = f(old)?;
            *slot = Some(new);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/rendezvous.rs"]
mod tests;
