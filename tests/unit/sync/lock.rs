use super::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn second_acquire_on_same_thread_is_reported() {
    let lock = Lock::new(1);
    let _guard = lock.acquire();
    assert!(matches!(lock.checked_acquire(), Err(Error::DoubleLock)));
}

#[test]
#[should_panic(expected = "Lock acquired twice")]
fn second_acquire_on_same_thread_panics() {
    let lock = Lock::new(());
    let _a = lock.acquire();
    let _b = lock.acquire();
}

#[test]
fn release_allows_reacquire() {
    let lock = Lock::new(0);
    {
        let mut guard = lock.acquire();
        *guard += 1;
        guard.release();
    }
    assert!(!lock.is_held_by_current_thread());
    assert_eq!(*lock.acquire(), 1);
}

#[test]
fn try_acquire_fails_while_other_thread_holds() {
    let lock = Arc::new(Lock::new(()));
    let guard = lock.acquire();
    let other = Arc::clone(&lock);
    let got = thread::spawn(move || other.try_acquire().is_some())
        .join()
        .unwrap();
    assert!(!got);
    drop(guard);
    assert!(lock.try_acquire().is_some());
}

#[test]
fn lock_serializes_increments() {
    let lock = Arc::new(Lock::new(0u32));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                for _ in 0..1000 {
                    *lock.acquire() += 1;
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(*lock.acquire(), 4000);
}

#[test]
fn reentrant_lock_nests_on_owner_thread() {
    let lock = ReentrantLock::new();
    let a = lock.acquire();
    let b = lock.acquire();
    assert_eq!(lock.depth(), 2);
    drop(b);
    assert!(lock.is_held_by_current_thread());
    drop(a);
    assert_eq!(lock.depth(), 0);
    assert!(!lock.is_held_by_current_thread());
}

#[test]
fn reentrant_lock_blocks_other_threads_until_fully_released() {
    let lock = Arc::new(ReentrantLock::new());
    let outer = lock.acquire();
    let inner = lock.acquire();

    let other = Arc::clone(&lock);
    let waiter = thread::spawn(move || {
        let _g = other.acquire();
        other.depth()
    });

    drop(inner);
    thread::sleep(Duration::from_millis(20));
    assert!(!waiter.is_finished());
    drop(outer);
    assert_eq!(waiter.join().unwrap(), 1);
}
