use super::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn take_blocks_until_put() {
    let cell = Arc::new(Rendezvous::new());
    let producer = Arc::clone(&cell);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        producer.put(7);
    });
    assert_eq!(cell.take(), 7);
    assert!(!cell.is_full());
    handle.join().unwrap();
}

#[test]
fn put_blocks_while_full() {
    let cell = Arc::new(Rendezvous::full(1));
    let producer = Arc::clone(&cell);
    let handle = thread::spawn(move || producer.put(2));

    thread::sleep(Duration::from_millis(20));
    assert!(!handle.is_finished());
    assert_eq!(cell.take(), 1);
    handle.join().unwrap();
    assert_eq!(cell.take(), 2);
}

#[test]
fn try_variants_do_not_block() {
    let cell = Rendezvous::new();
    assert_eq!(cell.try_take(), None);
    assert_eq!(cell.try_put("a"), Ok(()));
    assert_eq!(cell.try_put("b"), Err("b"));
    assert_eq!(cell.try_take(), Some("a"));
}

#[test]
fn timed_variants_give_up_at_deadline() {
    let cell = Rendezvous::full(1);
    let deadline = Instant::now() + Duration::from_millis(10);
    assert_eq!(cell.put_until(2, deadline), Err(2));
    assert_eq!(cell.take_until(deadline), Some(1));
    let deadline = Instant::now() + Duration::from_millis(10);
    assert_eq!(cell.take_until(deadline), None);
}

#[test]
fn update_keeps_old_value_on_failure() {
    let cell = Rendezvous::full(10);
    assert_eq!(cell.update(|v| Ok::<_, ()>(v + 1)), Ok(()));
    assert_eq!(cell.update(|_| Err("nope")), Err("nope"));
    assert!(cell.is_full());
    assert_eq!(cell.take(), 11);
}

#[test]
fn handoff_preserves_each_value_exactly_once() {
    let cell = Arc::new(Rendezvous::new());
    let producer = Arc::clone(&cell);
    let handle = thread::spawn(move || {
        for i in 0..100 {
            producer.put(i);
        }
    });
    let received: Vec<i32> = (0..100).map(|_| cell.take()).collect();
    handle.join().unwrap();
    assert_eq!(received, (0..100).collect::<Vec<_>>());
}
