use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use super::{thread_token, Condition};
use crate::error::{Error, Result};

/// Non-reentrant mutual exclusion over a value.
///
/// The lock remembers which thread holds it. A second acquisition from that
/// thread is a programming error: `acquire` panics and `checked_acquire`
/// reports `Error::DoubleLock`, where a plain mutex would deadlock silently.
pub struct Lock<T> {
    inner: Mutex<T>,
    holder: AtomicU64,
}

impl<T> Lock<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
            holder: AtomicU64::new(0),
        }
    }

    pub fn acquire(&self) -> LockGuard<'_, T> {
        match self.checked_acquire() {
            Ok(guard) => guard,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn checked_acquire(&self) -> Result<LockGuard<'_, T>> {
        if self.is_held_by_current_thread() {
            return Err(Error::DoubleLock);
        }
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(LockGuard::held(&self.holder, guard))
    }

    /// Acquires without blocking; `None` when another thread holds the lock.
    pub fn try_acquire(&self) -> Option<LockGuard<'_, T>> {
        if self.is_held_by_current_thread() {
            return None;
        }
        match self.inner.try_lock() {
            Ok(guard) => Some(LockGuard::held(&self.holder, guard)),
            Err(TryLockError::Poisoned(poisoned)) => {
                Some(LockGuard::held(&self.holder, poisoned.into_inner()))
            }
            Err(TryLockError::WouldBlock) => None,
        }
    }

    pub fn is_held_by_current_thread(&self) -> bool {
        self.holder.load(Ordering::Acquire) == thread_token()
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Default> Default for Lock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Clears the holder mark before the mutex itself is released.
pub(super) struct HolderMark<'a> {
    holder: &'a AtomicU64,
}

impl Drop for HolderMark<'_> {
    fn drop(&mut self) {
        self.holder.store(0, Ordering::Release);
    }
}

/// Proof that a `Lock` is held. Dropping it releases the lock.
///
/// `mark` is declared before `guard` so it drops first.
pub struct LockGuard<'a, T> {
    pub(super) mark: HolderMark<'a>,
    pub(super) guard: MutexGuard<'a, T>,
}

impl<'a, T> LockGuard<'a, T> {
    pub(super) fn held(holder: &'a AtomicU64, guard: MutexGuard<'a, T>) -> Self {
        holder.store(thread_token(), Ordering::Release);
        Self {
            mark: HolderMark { holder },
            guard,
        }
    }

    /// Splits the guard for a condition wait; the holder mark is cleared.
    pub(super) fn into_parts(self) -> (&'a AtomicU64, MutexGuard<'a, T>) {
        let LockGuard { mark, guard } = self;
        let holder = mark.holder;
        drop(mark);
        (holder, guard)
    }

    pub fn release(self) {}
}

impl<T> Deref for LockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for LockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

#[derive(Default)]
struct Ownership {
    owner: u64,
    depth: usize,
}

/// Recursive lock that protects no data of its own.
///
/// The runtime uses one instance as the global lock over the widget tree and
/// the rendering surface. The holding thread may acquire it again; other
/// threads block until every nested guard is dropped.
#[derive(Default)]
pub struct ReentrantLock {
    state: Lock<Ownership>,
    released: Condition,
}

impl ReentrantLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> ReentrantGuard<'_> {
        let me = thread_token();
        let mut state = self.state.acquire();
        state = self
            .released
            .wait_while(state, |s| s.owner != 0 && s.owner != me);
        state.owner = me;
        state.depth += 1;
        ReentrantGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    pub fn try_acquire(&self) -> Option<ReentrantGuard<'_>> {
        let me = thread_token();
        let mut state = self.state.acquire();
        if state.owner != 0 && state.owner != me {
            return None;
        }
        state.owner = me;
        state.depth += 1;
        Some(ReentrantGuard {
            lock: self,
            _not_send: PhantomData,
        })
    }

    pub fn is_held_by_current_thread(&self) -> bool {
        self.state.acquire().owner == thread_token()
    }

    /// Nesting depth of the current holder; zero when free.
    pub fn depth(&self) -> usize {
        self.state.acquire().depth
    }

    fn release(&self) {
        let mut state = self.state.acquire();
        state.depth -= 1;
        if state.depth == 0 {
            state.owner = 0;
            drop(state);
            self.released.wake_one();
        }
    }
}

/// One level of a `ReentrantLock` acquisition. Must be dropped on the thread
/// that created it.
pub struct ReentrantGuard<'a> {
    lock: &'a ReentrantLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ReentrantGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/lock.rs"]
mod tests;
