//! Blocking synchronization primitives used by the event pipeline.
//!
//! `Lock` is a non-reentrant mutex that detects a thread acquiring it twice,
//! `ReentrantLock` guards the widget tree and the rendering surface,
//! `Condition` pairs with `Lock`, and `Rendezvous` is a one-slot handoff cell.

mod condition;
mod lock;
mod rendezvous;

pub use condition::Condition;
pub use lock::{Lock, LockGuard, ReentrantGuard, ReentrantLock};
pub use rendezvous::Rendezvous;

use std::sync::atomic::{AtomicU64, Ordering};

/// Non-zero token identifying the calling thread; cheaper to compare than `ThreadId`.
pub(crate) fn thread_token() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    thread_local! {
        static TOKEN: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    TOKEN.with(|t| *t)
}
