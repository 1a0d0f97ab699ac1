use super::*;
use crate::ui::backend::test::{TestBackend, TestProbe};
use crate::ui::core::input::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::widgets::test_support::Fixed;
use std::cell::{Cell, RefCell};
use std::thread;

fn headless(w: u16, h: u16) -> (Runtime, TestProbe) {
    let backend = TestBackend::new(w, h);
    let probe = backend.probe();
    let rt = Runtime::init(backend, RuntimeOptions::headless()).unwrap();
    (rt, probe)
}

fn press(code: KeyCode, modifiers: KeyModifiers) -> InputEvent {
    InputEvent::Key(KeyEvent::press(code, modifiers))
}

#[test]
fn set_root_widget_sizes_shows_and_focuses_the_root() {
    let (mut rt, probe) = headless(20, 6);
    let root = Fixed::focusable(3, 3);
    assert!(rt.set_root_widget(Some(root.widget())).unwrap().is_none());

    assert_eq!(root.last_alloc(), Some(Rect::new(0, 0, 20, 6)));
    assert!(root.is_visible() && root.has_focus());
    assert_eq!(root.paints.get(), 1);
    assert_eq!(probe.clears(), 1);

    let next = Fixed::focusable(1, 1);
    let old = rt.set_root_widget(Some(next.widget())).unwrap().unwrap();
    assert!(same(&old, &root.widget()));
    assert!(!root.has_focus());
    assert!(root.core().handle().is_none());
    assert!(next.core().handle().is_some());
}

fn same(a: &WidgetRef, b: &WidgetRef) -> bool {
    crate::widgets::core::same_widget(a, b)
}

#[test]
fn redundant_redraw_requests_collapse_into_one_pass() {
    let (mut rt, probe) = headless(10, 4);
    let root = Fixed::new(1, 1);
    rt.set_root_widget(Some(root.widget())).unwrap();
    rt.poll().unwrap();
    let paints = root.paints.get();
    let flushes = probe.flushes();

    for _ in 0..5 {
        rt.handle().request_redraw();
    }
    assert_eq!(rt.handle().pending_events(), 1);
    assert_eq!(rt.poll().unwrap(), 1);
    assert_eq!(root.paints.get(), paints + 1);
    assert_eq!(probe.flushes(), flushes + 1);
}

#[test]
fn relayout_requests_reallocate_before_painting() {
    let (mut rt, _probe) = headless(10, 4);
    let root = Fixed::new(1, 1);
    rt.set_root_widget(Some(root.widget())).unwrap();
    rt.poll().unwrap();
    let allocs = root.allocs.borrow().len();

    rt.handle().request_cursor_update();
    rt.poll().unwrap();
    assert_eq!(root.allocs.borrow().len(), allocs);

    rt.handle().request_relayout();
    rt.handle().request_redraw();
    rt.poll().unwrap();
    assert_eq!(root.allocs.borrow().len(), allocs + 1);
}

#[test]
fn cursor_follows_the_root() {
    let (mut rt, probe) = headless(10, 4);
    let root = Fixed::focusable(1, 1);
    root.cursor.set(Some(Pos::new(4, 2)));
    rt.set_root_widget(Some(root.widget())).unwrap();
    assert_eq!(probe.cursor(), Some(Pos::new(4, 2)));

    root.cursor.set(None);
    rt.handle().request_cursor_update();
    rt.poll().unwrap();
    assert_eq!(probe.cursor(), None);
}

#[test]
fn timeouts_arrive_in_activation_order() {
    let (mut rt, _probe) = headless(4, 4);
    let order = Rc::new(RefCell::new(Vec::new()));
    for (tag, ms) in [("late", 50), ("early", 10)] {
        let order = Rc::clone(&order);
        let event = rt.local_event(move |_| {
            order.borrow_mut().push(tag);
            Ok(())
        });
        rt.handle()
            .add_timeout(Box::new(event), Duration::from_millis(ms))
            .unwrap();
    }

    thread::sleep(Duration::from_millis(80));
    rt.poll().unwrap();
    assert_eq!(*order.borrow(), vec!["early", "late"]);
}

#[test]
fn local_events_run_once_and_can_be_forgotten() {
    let (mut rt, _probe) = headless(4, 4);
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let event = rt.local_event(move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    });
    rt.handle().post_event(Box::new(event));
    rt.handle().post_event(Box::new(event));
    rt.poll().unwrap();
    assert_eq!(runs.get(), 1);

    let never = rt.local_event(|_| panic!("forgotten event ran"));
    assert!(rt.forget_local(never));
    rt.handle().post_event(Box::new(never));
    rt.poll().unwrap();
}

#[test]
fn mainloop_returns_after_exit_from_another_thread() {
    let (mut rt, _probe) = headless(4, 4);
    rt.set_root_widget(Some(Fixed::new(1, 1).widget())).unwrap();
    let handle = rt.handle().clone();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        handle.exit_main();
    });
    rt.mainloop().unwrap();
    stopper.join().unwrap();

    // The exit request is consumed; the loop can be entered again.
    rt.handle().exit_main();
    rt.mainloop().unwrap();
}

#[test]
fn mainloop_returns_the_first_event_error() {
    let (mut rt, _probe) = headless(4, 4);
    rt.set_root_widget(Some(Fixed::new(1, 1).widget())).unwrap();
    rt.handle()
        .post_fn(|_| Err(Error::InputEof { errno: None }));
    let err = rt.mainloop().unwrap_err();
    assert!(matches!(err, Error::InputEof { .. }));
}

#[test]
fn mainloop_without_a_root_returns_at_once() {
    let (mut rt, _probe) = headless(4, 4);
    rt.mainloop().unwrap();
}

#[test]
fn main_hooks_run_after_every_poll() {
    let (mut rt, _probe) = headless(4, 4);
    let turns = Rc::new(Cell::new(0));
    let counter = Rc::clone(&turns);
    rt.on_main_hook(move |_| counter.set(counter.get() + 1));
    rt.poll().unwrap();
    rt.poll().unwrap();
    assert_eq!(turns.get(), 2);
}

#[test]
fn keys_reach_the_root_and_refresh_redraws() {
    let (mut rt, probe) = headless(8, 2);
    let root = Fixed::focusable(1, 1);
    rt.set_root_widget(Some(root.widget())).unwrap();
    let clears = probe.clears();

    probe.push_input(press(KeyCode::Char('x'), KeyModifiers::NONE));
    probe.push_input(press(KeyCode::Char('l'), KeyModifiers::CONTROL));
    assert_eq!(rt.read_input().unwrap(), ReadOutcome::Consumed);

    assert_eq!(*root.keys.borrow(), vec![Key::char('x')]);
    assert_eq!(probe.clears(), clears + 1);
}

#[test]
fn released_keys_are_ignored_and_paste_becomes_keys() {
    let (mut rt, probe) = headless(8, 2);
    let root = Fixed::focusable(1, 1);
    rt.set_root_widget(Some(root.widget())).unwrap();

    let mut release = KeyEvent::press(KeyCode::Char('a'), KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;
    rt.dispatch_input(InputEvent::Key(release)).unwrap();
    rt.dispatch_input(InputEvent::Paste("hi".into())).unwrap();
    assert_eq!(*root.keys.borrow(), vec![Key::char('h'), Key::char('i')]);
    assert_eq!(probe.pending_input(), 0);
}

#[test]
fn mouse_events_are_translated_into_the_root_frame() {
    let (mut rt, _probe) = headless(8, 4);
    let root = Fixed::new(1, 1);
    rt.set_root_widget(Some(root.widget())).unwrap();
    rt.dispatch_input(InputEvent::Mouse(MouseEvent::new(MouseEventKind::Moved, 5, 2)))
        .unwrap();
    let mice = root.mice.borrow();
    assert_eq!((mice[0].column, mice[0].row), (5, 2));
}

#[test]
fn an_empty_read_is_end_of_file_unless_interrupted() {
    let (mut rt, probe) = headless(4, 4);
    assert_eq!(rt.read_input().unwrap(), ReadOutcome::Eof { errno: None });

    probe.push_error(io::ErrorKind::Interrupted);
    assert_eq!(rt.read_input().unwrap(), ReadOutcome::Consumed);

    probe.push_error(io::ErrorKind::WouldBlock);
    assert_eq!(rt.read_input().unwrap(), ReadOutcome::Eof { errno: None });
}

#[test]
fn resize_reallocates_the_root() {
    let (mut rt, probe) = headless(10, 4);
    let root = Fixed::new(1, 1);
    rt.set_root_widget(Some(root.widget())).unwrap();

    probe.resize(30, 12);
    probe.push_input(InputEvent::Resize(30, 12));
    assert_eq!(rt.read_input().unwrap(), ReadOutcome::Consumed);
    assert_eq!(root.last_alloc(), Some(Rect::new(0, 0, 30, 12)));
    assert_eq!(probe.buffer().size(), crate::ui::core::geom::Size::new(30, 12));
}

#[test]
fn suspend_and_resume_hand_the_surface_back_and_forth() {
    let (mut rt, probe) = headless(10, 4);
    let root = Fixed::new(1, 1);
    rt.set_root_widget(Some(root.widget())).unwrap();
    let paints = root.paints.get();

    rt.suspend().unwrap();
    rt.suspend().unwrap();
    assert!(probe.is_suspended());
    assert_eq!(rt.suspend_count(), 1);

    // Nothing is drawn while suspended.
    rt.handle().request_redraw();
    rt.poll().unwrap();
    assert_eq!(root.paints.get(), paints);

    rt.resume().unwrap();
    assert!(!probe.is_suspended());
    assert_eq!(root.paints.get(), paints + 1);
}

#[test]
fn shutdown_destroys_the_root_and_discards_events() {
    let (mut rt, probe) = headless(10, 4);
    let root = Fixed::new(1, 1);
    rt.set_root_widget(Some(root.widget())).unwrap();
    rt.handle().post_fn(|_| panic!("discarded event ran"));
    rt.handle()
        .add_timeout(from_fn(|_| Ok(())), Duration::from_secs(60))
        .unwrap();

    rt.shutdown().unwrap();
    assert!(root.is_destroyed());
    assert!(rt.root().is_none());
    assert!(probe.is_suspended());
    assert_eq!(rt.handle().pending_events(), 0);
    assert_eq!(rt.handle().shared.timeouts.pending(), 0);
    rt.shutdown().unwrap();
}

#[test]
fn settings_override_bindings_and_styles() {
    use crate::config::settings::KeybindingRule;
    use crate::ui::core::style::Color;

    let mut settings = Settings::default();
    settings.keybindings.push(KeybindingRule {
        key: "ctrl+r".into(),
        action: "Refresh".into(),
        scope: None,
    });
    settings.styles.insert(
        "Default".into(),
        crate::config::settings::StyleOverride {
            fg: Some("red".into()),
            ..Default::default()
        },
    );
    let options = RuntimeOptions {
        settings: Some(settings),
        ..RuntimeOptions::headless()
    };
    let rt = Runtime::init(TestBackend::new(4, 4), options).unwrap();
    let refresh = Key::ctrl(KeyCode::Char('r'));
    assert!(rt.global_bindings().key_matches(&refresh, "Refresh"));
    assert_eq!(rt.styles().get("Default").fg, Some(Color::Indexed(1)));
}

#[test]
fn scopes_inherit_from_the_global_bindings() {
    let (mut rt, _probe) = headless(4, 4);
    let scope = rt.bindings_scope("editor");
    assert!(scope.key_matches(&Key::char('q'), "Quit"));
    assert!(Rc::ptr_eq(&scope, &rt.bindings_scope("editor")));
    assert!(Rc::ptr_eq(&rt.bindings_scope(GLOBAL_SCOPE), &rt.global_bindings()));
}

#[test]
fn the_global_lock_excludes_the_dispatcher() {
    let (mut rt, _probe) = headless(4, 4);
    let handle = rt.handle().clone();
    let (locked_tx, locked_rx) = std::sync::mpsc::channel();
    let holder = thread::spawn(move || {
        let _guard = handle.lock();
        locked_tx.send(()).unwrap();
        thread::sleep(Duration::from_millis(40));
    });
    locked_rx.recv().unwrap();
    rt.handle().post_fn(|_| Ok(()));
    let started = std::time::Instant::now();
    rt.poll().unwrap();
    assert!(started.elapsed() >= Duration::from_millis(20));
    holder.join().unwrap();
}
