use std::sync::atomic::AtomicU64;
use std::sync::{Condvar, MutexGuard, PoisonError};
use std::time::Instant;

use super::LockGuard;

/// Condition variable bound to `Lock` guards.
///
/// Waiting consumes the guard and hands it back once the lock is re-held, so
/// waiting without holding the lock cannot be expressed.
#[derive(Default)]
pub struct Condition {
    inner: Condvar,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake_one(&self) {
        self.inner.notify_one();
    }

    pub fn wake_all(&self) {
        self.inner.notify_all();
    }

    /// Releases the lock, blocks until woken, and re-acquires it. Spurious
    /// wakeups are possible.
    pub fn wait<'a, T>(&self, guard: LockGuard<'a, T>) -> LockGuard<'a, T> {
        let (holder, guard) = guard.into_parts();
        let guard = self.inner.wait(guard).unwrap_or_else(PoisonError::into_inner);
        LockGuard::held(holder, guard)
    }

    /// Waits until `blocked` returns false. The predicate runs with the lock held.
    pub fn wait_while<'a, T, F>(&self, guard: LockGuard<'a, T>, mut blocked: F) -> LockGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        let (holder, guard) = guard.into_parts();
        let guard = self
            .inner
            .wait_while(guard, |value| blocked(value))
            .unwrap_or_else(PoisonError::into_inner);
        LockGuard::held(holder, guard)
    }

    /// Waits until woken or `deadline` passes. The flag is true on timeout.
    pub fn wait_until<'a, T>(
        &self,
        guard: LockGuard<'a, T>,
        deadline: Instant,
    ) -> (LockGuard<'a, T>, bool) {
        let (holder, guard) = guard.into_parts();
        let (guard, timed_out) = self.timed(guard, deadline);
        (LockGuard::held(holder, guard), timed_out)
    }

    /// Like `wait_while` but gives up at `deadline`. The flag is true when the
    /// predicate still blocks after the deadline.
    pub fn wait_while_until<'a, T, F>(
        &self,
        guard: LockGuard<'a, T>,
        deadline: Instant,
        mut blocked: F,
    ) -> (LockGuard<'a, T>, bool)
    where
        F: FnMut(&mut T) -> bool,
    {
        let (holder, mut guard): (&'a AtomicU64, MutexGuard<'a, T>) = guard.into_parts();
        loop {
            if !blocked(&mut *guard) {
                return (LockGuard::held(holder, guard), false);
            }
            let (next, timed_out) = self.timed(guard, deadline);
            guard = next;
            if timed_out {
                let still_blocked = blocked(&mut *guard);
                return (LockGuard::held(holder, guard), still_blocked);
            }
        }
    }

    fn timed<'a, T>(&self, guard: MutexGuard<'a, T>, deadline: Instant) -> (MutexGuard<'a, T>, bool) {
        let now = Instant::now();
        if deadline <= now {
            return (guard, true);
        }
        let (guard, result) = self
            .inner
            .wait_timeout(guard, deadline - now)
            .unwrap_or_else(PoisonError::into_inner);
        (guard, result.timed_out())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/condition.rs"]
mod tests;
