use super::*;
use crate::ui::core::input::{KeyCode, MouseEventKind};
use crate::widgets::test_support::Fixed;

fn shown(w: u16, h: u16) -> Rc<Fixed> {
    let fixed = Fixed::new(w, h);
    fixed.show();
    fixed
}

#[test]
fn vertical_children_get_full_width_and_requested_height() {
    let boxed = Boxed::vertical();
    let a = shown(10, 3);
    let b = shown(20, 1);
    boxed.add_widget(a.widget());
    boxed.add_widget(b.widget());

    boxed.alloc_size(Rect::new(0, 0, 30, 10));
    assert_eq!(a.last_alloc(), Some(Rect::new(0, 0, 30, 3)));
    assert_eq!(b.last_alloc(), Some(Rect::new(0, 3, 30, 1)));
    assert_eq!(boxed.width_request(), 20);
    assert_eq!(boxed.height_request(30), 4);
}

#[test]
fn horizontal_children_get_full_height_and_requested_width() {
    let boxed = Boxed::horizontal();
    let a = shown(4, 2);
    let b = shown(6, 5);
    boxed.add_widget(a.widget());
    boxed.add_widget(b.widget());

    boxed.alloc_size(Rect::new(0, 0, 20, 3));
    assert_eq!(a.last_alloc(), Some(Rect::new(0, 0, 4, 3)));
    assert_eq!(b.last_alloc(), Some(Rect::new(4, 0, 6, 3)));
    assert_eq!(boxed.width_request(), 10);
    assert_eq!(boxed.height_request(20), 5);
}

#[test]
fn allocation_is_clipped_to_what_is_left() {
    let boxed = Boxed::vertical();
    let a = shown(1, 4);
    let b = shown(1, 4);
    let c = shown(1, 4);
    for w in [&a, &b, &c] {
        boxed.add_widget(w.widget());
    }

    boxed.alloc_size(Rect::new(0, 0, 5, 6));
    assert_eq!(a.last_alloc(), Some(Rect::new(0, 0, 5, 4)));
    assert_eq!(b.last_alloc(), Some(Rect::new(0, 4, 5, 2)));
    assert_eq!(c.last_alloc(), Some(Rect::new(0, 6, 5, 0)));
}

#[test]
fn expanding_children_share_the_leftover() {
    let boxed = Boxed::vertical();
    let a = shown(1, 1);
    let b = shown(1, 1);
    let c = shown(1, 1);
    boxed.add_widget_opts(a.widget(), true);
    boxed.add_widget(b.widget());
    boxed.add_widget_opts(c.widget(), true);

    boxed.alloc_size(Rect::new(0, 0, 2, 10));
    // 7 spare rows: 4 to the first expander, 3 to the second.
    assert_eq!(a.last_alloc(), Some(Rect::new(0, 0, 2, 5)));
    assert_eq!(b.last_alloc(), Some(Rect::new(0, 5, 2, 1)));
    assert_eq!(c.last_alloc(), Some(Rect::new(0, 6, 2, 4)));
}

#[test]
fn hidden_children_get_the_empty_rect_and_take_no_space() {
    let boxed = Boxed::vertical();
    let a = Fixed::new(3, 3);
    let b = shown(3, 2);
    boxed.add_widget(a.widget());
    boxed.add_widget(b.widget());

    boxed.alloc_size(Rect::new(0, 0, 3, 8));
    assert_eq!(a.last_alloc(), Some(Rect::ZERO));
    assert_eq!(b.last_alloc(), Some(Rect::new(0, 0, 3, 2)));
    assert_eq!(boxed.height_request(3), 2);
}

#[test]
fn focus_goes_to_the_first_focusable_child_and_cycles() {
    let bindings = Rc::new(Keybindings::with_defaults());
    let boxed = Boxed::vertical();
    let _cycle = boxed.bind_cycle(&bindings);
    let plain = shown(1, 1);
    let a = shown(1, 1);
    let b = shown(1, 1);
    let _ka = a.connect_key("Confirm", &bindings, || {});
    let _kb = b.connect_key("Confirm", &bindings, || {});
    for w in [&plain, &a, &b] {
        boxed.add_widget(w.widget());
    }

    boxed.focus();
    assert!(a.has_focus());
    assert!(!plain.has_focus());

    assert!(boxed.dispatch_key(&Key::simple(KeyCode::Tab)));
    assert!(b.has_focus() && !a.has_focus());
    boxed.dispatch_key(&Key::simple(KeyCode::Tab));
    assert!(a.has_focus() && !b.has_focus());
}

#[test]
fn set_focus_widget_and_hiding_move_focus() {
    let bindings = Rc::new(Keybindings::with_defaults());
    let boxed = Boxed::vertical();
    let a = shown(1, 1);
    let b = shown(1, 1);
    let _ka = a.connect_key("Confirm", &bindings, || {});
    let _kb = b.connect_key("Confirm", &bindings, || {});
    boxed.add_widget(a.widget());
    boxed.add_widget(b.widget());
    boxed.focus();

    boxed.set_focus_widget(&b.widget());
    assert!(b.has_focus() && !a.has_focus());

    b.hide();
    assert!(a.has_focus() && !b.has_focus());

    boxed.unfocus();
    assert!(!a.has_focus());
}

#[test]
fn removing_the_focused_child_refocuses() {
    let bindings = Rc::new(Keybindings::with_defaults());
    let boxed = Boxed::vertical();
    let a = shown(1, 1);
    let b = shown(1, 1);
    let _ka = a.connect_key("Confirm", &bindings, || {});
    let _kb = b.connect_key("Confirm", &bindings, || {});
    boxed.add_widget(a.widget());
    boxed.add_widget(b.widget());
    boxed.focus();
    assert!(a.has_focus());

    boxed.rem_widget(&a.widget());
    assert!(!a.has_focus());
    assert!(b.has_focus());
    assert!(a.owner().is_none());
}

#[test]
fn mouse_reaches_the_child_under_the_pointer() {
    let boxed = Boxed::vertical();
    let a = shown(1, 2);
    let b = shown(1, 2);
    boxed.add_widget(a.widget());
    boxed.add_widget(b.widget());
    boxed.alloc_size(Rect::new(0, 0, 4, 4));

    boxed.dispatch_mouse(MouseEvent::new(MouseEventKind::Moved, 2, 3));
    assert!(a.mice.borrow().is_empty());
    let mice = b.mice.borrow();
    assert_eq!((mice[0].column, mice[0].row), (2, 1));
}
