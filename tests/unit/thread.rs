use super::*;
use crate::sync::Rendezvous;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

#[test]
fn join_waits_for_body() {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let thread = Thread::spawn("worker", move |_| {
        std::thread::sleep(Duration::from_millis(10));
        flag.store(true, Ordering::SeqCst);
    })
    .unwrap();
    assert_eq!(thread.name(), "worker");
    thread.join().unwrap();
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn panicking_body_reports_join_error() {
    let thread = Thread::spawn("boom", |_| panic!("boom")).unwrap();
    match thread.join() {
        Err(Error::ThreadJoin { name }) => assert_eq!(name, "boom"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn cancel_hook_wakes_blocked_body() {
    let cell: Arc<Rendezvous<()>> = Arc::new(Rendezvous::new());
    let wait_cell = Arc::clone(&cell);
    let thread = Thread::spawn("blocked", move |stop| {
        let hook_cell = Arc::clone(&wait_cell);
        stop.on_cancel(move || {
            let _ = hook_cell.try_put(());
        });
        while !stop.is_stopped() {
            wait_cell.take();
        }
    })
    .unwrap();
    std::thread::sleep(Duration::from_millis(10));
    thread.cancel_and_join().unwrap();
}

#[test]
fn hooks_registered_after_cancel_run_immediately() {
    let thread = Thread::spawn("late", |_| {}).unwrap();
    let token = thread.token().clone();
    thread.cancel();
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    token.on_cancel(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(count.load(Ordering::SeqCst), 1);
    thread.cancel();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    thread.join().unwrap();
}

#[test]
fn dropping_handle_detaches_running_thread() {
    let done = Arc::new(Rendezvous::new());
    let tx = Arc::clone(&done);
    let thread = Thread::spawn("detached", move |_| {
        std::thread::sleep(Duration::from_millis(10));
        tx.put(42);
    })
    .unwrap();
    drop(thread);
    assert_eq!(done.take(), 42);
}
