//! Timeout scheduler: a singleton thread that posts events at their
//! activation instant.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::event::BoxedEvent;
use crate::sync::{Condition, Lock, Rendezvous};
use crate::thread::Thread;

/// Entries due within this margin of now are posted in the same scan.
const TOLERANCE: Duration = Duration::from_micros(10);

/// Identifier returned by `add`. Allocated as the largest live id plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeoutId(u32);

impl TimeoutId {
    pub fn get(self) -> u32 {
        self.0
    }
}

struct Entry {
    event: BoxedEvent,
    activate_at: Instant,
}

#[derive(Default)]
struct Entries {
    map: BTreeMap<TimeoutId, Entry>,
    cancelled: bool,
}

#[derive(Default)]
struct Shared {
    entries: Lock<Entries>,
    changed: Condition,
}

pub struct TimeoutScheduler {
    shared: Arc<Shared>,
    /// Running thread, if any. Always full outside `start`/`stop`.
    running: Rendezvous<Option<Thread>>,
}

impl Default for TimeoutScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeoutScheduler {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            running: Rendezvous::full(None),
        }
    }

    /// Starts the scheduler thread; `post` delivers due events. Fails with
    /// `SingletonViolation` if it is already running.
    pub fn start<F>(&self, post: F) -> Result<()>
    where
        F: Fn(BoxedEvent) + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        self.running.update(move |current| {
            if current.is_some() {
                return Err(Error::SingletonViolation("timeout scheduler"));
            }
            shared.entries.acquire().cancelled = false;
            let thread = Thread::spawn("timeouts", move |token| {
                let waker = Arc::clone(&shared);
                token.on_cancel(move || {
                    waker.entries.acquire().cancelled = true;
                    waker.changed.wake_all();
                });
                run(&shared, &post);
            })?;
            Ok(Some(thread))
        })
    }

    /// Cancels and joins the thread. Pending entries are kept.
    pub fn stop(&self) -> Result<()> {
        let result = match self.running.take() {
            Some(thread) => thread.cancel_and_join(),
            None => Ok(()),
        };
        self.running.put(None);
        result
    }

    /// Schedules `event` to be posted after `delay`.
    pub fn add(&self, event: BoxedEvent, delay: Duration) -> Result<TimeoutId> {
        let mut entries = self.shared.entries.acquire();
        let id = match entries.map.keys().next_back() {
            None => TimeoutId(0),
            Some(last) => match last.0.checked_add(1) {
                Some(next) => TimeoutId(next),
                None => {
                    tracing::warn!(last = last.0, "timeout ids exhausted");
                    return Err(Error::TimeoutIdsExhausted);
                }
            },
        };
        entries.map.insert(
            id,
            Entry {
                event,
                activate_at: Instant::now() + delay,
            },
        );
        drop(entries);
        self.shared.changed.wake_all();
        tracing::debug!(id = id.0, ?delay, "timeout added");
        Ok(id)
    }

    /// Forgets a pending entry; false if it already fired or never existed.
    pub fn remove(&self, id: TimeoutId) -> bool {
        let removed = self.shared.entries.acquire().map.remove(&id).is_some();
        if removed {
            self.shared.changed.wake_all();
        }
        removed
    }

    pub fn pending(&self) -> usize {
        self.shared.entries.acquire().map.len()
    }

    /// Drops every pending entry.
    pub fn clear(&self) {
        self.shared.entries.acquire().map.clear();
        self.shared.changed.wake_all();
    }
}

fn run(shared: &Shared, post: &dyn Fn(BoxedEvent)) {
    let mut entries = shared.entries.acquire();
    loop {
        if entries.cancelled {
            return;
        }
        let horizon = Instant::now() + TOLERANCE;
        let mut due: Vec<(Instant, TimeoutId)> = entries
            .map
            .iter()
            .filter(|(_, e)| e.activate_at <= horizon)
            .map(|(id, e)| (e.activate_at, *id))
            .collect();
        if !due.is_empty() {
            due.sort();
            let events: Vec<BoxedEvent> = due
                .iter()
                .filter_map(|(_, id)| entries.map.remove(id))
                .map(|entry| entry.event)
                .collect();
            drop(entries);
            tracing::trace!(count = events.len(), "timeouts fired");
            for event in events {
                post(event);
            }
            entries = shared.entries.acquire();
            continue;
        }
        let next = entries.map.values().map(|e| e.activate_at).min();
        entries = match next {
            Some(deadline) => shared.changed.wait_until(entries, deadline).0,
            None => shared.changed.wait(entries),
        };
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/timeout.rs"]
mod tests;
