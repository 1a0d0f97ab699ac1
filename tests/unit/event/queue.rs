use super::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn try_get_on_empty_returns_none() {
    let q: EventQueue<u32> = EventQueue::new();
    assert_eq!(q.try_get(), None);
    q.put(1);
    q.put(2);
    assert_eq!(q.len(), 2);
    assert_eq!(q.try_get(), Some(1));
    assert_eq!(q.try_get(), Some(2));
    assert!(q.is_empty());
}

#[test]
fn get_blocks_until_put() {
    let q = Arc::new(EventQueue::new());
    let producer = Arc::clone(&q);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        producer.put("late");
    });
    assert_eq!(q.get(), "late");
    handle.join().unwrap();
}

#[test]
fn get_until_gives_up() {
    let q: EventQueue<()> = EventQueue::new();
    assert!(q
        .get_until(Instant::now() + Duration::from_millis(10))
        .is_none());
}

#[test]
fn each_producer_order_is_preserved() {
    let q = Arc::new(EventQueue::new());
    let producers: Vec<_> = (0..4u32)
        .map(|p| {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                for i in 0..250u32 {
                    q.put((p, i));
                }
            })
        })
        .collect();
    for h in producers {
        h.join().unwrap();
    }

    let mut next = [0u32; 4];
    while let Some((p, i)) = q.try_get() {
        assert_eq!(i, next[p as usize], "producer {} out of order", p);
        next[p as usize] += 1;
    }
    assert_eq!(next, [250; 4]);
}

#[test]
fn clear_discards_everything() {
    let q = EventQueue::new();
    for i in 0..5 {
        q.put(i);
    }
    assert_eq!(q.clear(), 5);
    assert_eq!(q.try_get(), None);
}
