use super::*;
use crate::ui::backend::test::TestBackend;
use crate::ui::backend::Backend;
use crate::ui::core::input::MouseButton;
use crate::ui::core::painter::Painter;
use crate::widgets::test_support::Fixed;

fn visible_is(mux: &Multiplex, w: &Rc<Fixed>) -> bool {
    mux.visible_widget()
        .is_some_and(|v| same_widget(&v, &w.widget()))
}

fn three_pages(mux: &Multiplex) -> [Rc<Fixed>; 3] {
    let pages = [Fixed::new(4, 2), Fixed::new(6, 1), Fixed::new(2, 3)];
    for (i, page) in pages.iter().enumerate() {
        mux.add_widget_titled(page.widget(), format!("p{i}"));
    }
    pages
}

#[test]
fn showing_a_child_selects_it() {
    let mux = Multiplex::new(false);
    let [a, b, _c] = three_pages(&mux);
    assert!(mux.visible_widget().is_none());

    a.show();
    assert!(visible_is(&mux, &a));
    b.show();
    assert!(visible_is(&mux, &b));
    assert_eq!(mux.num_children(), 3);
    assert_eq!(mux.num_visible(), 2);
}

#[test]
fn hiding_the_visible_child_falls_back_to_the_previous_visible_one() {
    let mux = Multiplex::new(false);
    let [a, b, c] = three_pages(&mux);
    a.show();
    c.show();
    assert!(visible_is(&mux, &c));

    c.hide();
    assert!(visible_is(&mux, &a));

    // Hiding a child that is not on screen changes nothing.
    b.hide();
    assert!(visible_is(&mux, &a));

    a.hide();
    assert!(mux.visible_widget().is_none());
}

#[test]
fn hiding_the_first_child_wraps_to_the_last_visible() {
    let mux = Multiplex::new(false);
    let [a, b, c] = three_pages(&mux);
    b.show();
    c.show();
    a.show();

    a.hide();
    assert!(visible_is(&mux, &c));
}

#[test]
fn cycling_skips_hidden_children_and_wraps() {
    let mux = Multiplex::new(false);
    let [a, b, c] = three_pages(&mux);
    a.show();
    c.show();
    mux.show_widget(&a.widget());

    let cycles = Rc::new(Cell::new(0));
    let count = Rc::clone(&cycles);
    let _conn = mux.on_cycled(move || count.set(count.get() + 1));

    mux.cycle_forward();
    assert!(visible_is(&mux, &c));
    mux.cycle_forward();
    assert!(visible_is(&mux, &a));
    mux.cycle_backward();
    assert!(visible_is(&mux, &c));
    assert_eq!(cycles.get(), 3);
    assert!(!b.is_visible());
}

#[test]
fn focus_moves_with_the_visible_child() {
    let mux = Multiplex::new(false);
    let [a, b, _c] = three_pages(&mux);
    a.show();
    b.show();
    mux.focus();
    assert!(b.has_focus() && !a.has_focus());

    mux.cycle_forward();
    assert!(a.has_focus() && !b.has_focus());

    mux.unfocus();
    assert!(!a.has_focus());
}

#[test]
fn requests_cover_visible_children_plus_the_tab_row() {
    let mux = Multiplex::new(true);
    let [a, _b, c] = three_pages(&mux);
    a.show();
    assert_eq!((mux.width_request(), mux.height_request(10)), (4, 2));
    assert!(!mux.tabs_visible());

    c.show();
    assert!(mux.tabs_visible());
    assert_eq!((mux.width_request(), mux.height_request(10)), (4, 4));

    mux.set_show_tabs(false);
    assert_eq!(mux.height_request(10), 3);
}

#[test]
fn layout_gives_the_visible_child_the_area_below_the_tabs() {
    let mux = Multiplex::new(true);
    let [a, b, c] = three_pages(&mux);
    a.show();
    b.show();
    mux.alloc_size(Rect::new(0, 0, 10, 5));

    assert_eq!(b.last_alloc(), Some(Rect::new(0, 1, 10, 4)));
    assert_eq!(a.last_alloc(), Some(Rect::ZERO));
    assert_eq!(c.last_alloc(), Some(Rect::ZERO));

    b.hide();
    mux.alloc_size(Rect::new(0, 0, 10, 5));
    assert_eq!(a.last_alloc(), Some(Rect::new(0, 0, 10, 5)));
}

#[test]
fn tabs_split_the_row_and_centre_titles() {
    let mux = Multiplex::new(true);
    let a = Fixed::filled(1, 1, 'a');
    let b = Fixed::filled(1, 1, 'b');
    mux.add_widget_titled(a.widget(), "one");
    mux.add_widget_titled(b.widget(), "two");
    mux.show();
    mux.alloc_size(Rect::new(0, 0, 11, 2));

    let mut painter = Painter::new();
    {
        let mut canvas = Canvas::new(&mut painter, Rect::new(0, 0, 11, 2));
        mux.display(&mut canvas, Style::default());
    }
    let mut backend = TestBackend::new(11, 2);
    let probe = backend.probe();
    backend.draw(painter.cmds());
    assert_eq!(probe.row(0), " one  two  ");
    assert_eq!(probe.row(1), "bbbbbbbbbbb");
}

#[test]
fn clicking_a_tab_selects_it() {
    let mux = Multiplex::new(true);
    let [a, b, _c] = three_pages(&mux);
    a.show();
    b.show();
    mux.alloc_size(Rect::new(0, 0, 10, 5));

    mux.dispatch_mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 1, 0));
    assert!(visible_is(&mux, &a));

    mux.alloc_size(Rect::new(0, 0, 10, 5));
    mux.dispatch_mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 3, 2));
    let mice = a.mice.borrow();
    assert_eq!(mice.len(), 1);
    assert_eq!((mice[0].column, mice[0].row), (3, 1));
}

#[test]
fn add_widget_after_inserts_next_to_its_anchor() {
    let mux = Multiplex::new(false);
    let [a, _b, _c] = three_pages(&mux);
    let d = Fixed::new(1, 1);
    mux.add_widget_after(d.widget(), &a.widget(), "d");
    assert!(same_widget(&mux.children()[1], &d.widget()));

    let stray = Fixed::new(1, 1);
    let e = Fixed::new(1, 1);
    mux.add_widget_after(e.widget(), &stray.widget(), "e");
    assert!(same_widget(&mux.children()[4], &e.widget()));
    assert_eq!(mux.title(&e.widget()).as_deref(), Some("e"));

    mux.add_widget(Fixed::new(1, 1).widget());
    assert_eq!(mux.title(&mux.children()[5]).as_deref(), Some("Untitled"));
}

#[test]
fn removing_the_visible_child_selects_another_and_detaches() {
    let mux = Multiplex::new(false);
    let [a, b, _c] = three_pages(&mux);
    a.show();
    b.show();

    mux.rem_widget(&b.widget());
    assert!(visible_is(&mux, &a));
    assert!(b.owner().is_none());
    assert_eq!(mux.num_children(), 2);
}

#[test]
fn destroy_leaves_no_children() {
    let mux = Multiplex::new(true);
    let pages = three_pages(&mux);
    for p in &pages {
        p.show();
    }
    mux.destroy();
    assert!(pages.iter().all(|p| p.is_destroyed()));
    assert_eq!(mux.num_children(), 0);
    assert!(mux.visible_widget().is_none());
}

#[test]
fn titles_wider_than_their_tab_are_dropped_not_overflowed() {
    let mux = Multiplex::new(true);
    let a = Fixed::filled(1, 1, 'a');
    let b = Fixed::filled(1, 1, 'b');
    mux.add_widget_titled(a.widget(), "\u{2764}\u{FE0F}");
    mux.add_widget_titled(b.widget(), "x");
    a.show();
    b.show();
    mux.show();
    mux.alloc_size(Rect::new(0, 0, 2, 3));

    let mut painter = Painter::new();
    {
        let mut canvas = Canvas::new(&mut painter, Rect::new(0, 0, 2, 3));
        mux.display(&mut canvas, Style::default());
    }
    let mut backend = TestBackend::new(2, 3);
    let screen = backend.probe();
    backend.draw(painter.cmds());
    assert!(screen.row(0).ends_with('x'));
    assert_eq!(screen.row(1), "bb");
}

#[test]
fn truncation_keeps_whole_graphemes() {
    assert_eq!(truncate_to_width("one", 2), "on");
    assert_eq!(truncate_to_width("e\u{301}x", 1), "e\u{301}");
    assert_eq!(truncate_to_width("\u{4e2d}\u{6587}", 3), "\u{4e2d}");
    for title in ["\u{2764}\u{FE0F}", "\u{1F469}\u{200D}\u{1F4BB}", "a\u{FE0F}b"] {
        for w in 0..4 {
            assert!(truncate_to_width(title, w).width() <= w as usize);
        }
    }
}
