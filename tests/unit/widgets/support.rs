//! Leaf widget with scripted size requests that records what the tree does
//! to it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::ui::core::canvas::Canvas;
use crate::ui::core::geom::{Pos, Rect, Size};
use crate::ui::core::input::{Key, MouseEvent};
use crate::ui::core::style::Style;
use crate::widgets::core::{Widget, WidgetCore, WidgetExt, WidgetRef};

pub struct Fixed {
    core: WidgetCore,
    pub size: Cell<Size>,
    pub focusable: Cell<bool>,
    pub cursor: Cell<Option<Pos>>,
    pub fill: Cell<Option<char>>,
    pub allocs: RefCell<Vec<Rect>>,
    pub keys: RefCell<Vec<Key>>,
    pub mice: RefCell<Vec<MouseEvent>>,
    pub paints: Cell<usize>,
}

impl Fixed {
    pub fn new(w: u16, h: u16) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: WidgetCore::new(this.clone()),
            size: Cell::new(Size::new(w, h)),
            focusable: Cell::new(false),
            cursor: Cell::new(None),
            fill: Cell::new(None),
            allocs: RefCell::new(Vec::new()),
            keys: RefCell::new(Vec::new()),
            mice: RefCell::new(Vec::new()),
            paints: Cell::new(0),
        })
    }

    /// Accepts focus and consumes every key.
    pub fn focusable(w: u16, h: u16) -> Rc<Self> {
        let fixed = Self::new(w, h);
        fixed.focusable.set(true);
        fixed
    }

    /// Shown, and painting `ch` over its allocation.
    pub fn filled(w: u16, h: u16, ch: char) -> Rc<Self> {
        let fixed = Self::new(w, h);
        fixed.fill.set(Some(ch));
        fixed.show();
        fixed
    }

    pub fn widget(self: &Rc<Self>) -> WidgetRef {
        self.clone()
    }

    pub fn last_alloc(&self) -> Option<Rect> {
        self.allocs.borrow().last().copied()
    }
}

impl Widget for Fixed {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn width_request(&self) -> u16 {
        self.size.get().w
    }

    fn height_request(&self, _width: u16) -> u16 {
        self.size.get().h
    }

    fn layout(&self) {
        self.allocs.borrow_mut().push(self.geometry());
    }

    fn paint(&self, canvas: &mut Canvas<'_>, style: Style) {
        self.paints.set(self.paints.get() + 1);
        if let Some(ch) = self.fill.get() {
            let Size { w, h } = canvas.size();
            for y in 0..h {
                canvas.hline(0, y, w, ch, style);
            }
        }
    }

    fn focus_me(&self) -> bool {
        !self.is_destroyed() && (self.focusable.get() || self.core().has_pre_bindings())
    }

    fn handle_key(&self, key: &Key) -> bool {
        if self.focusable.get() {
            self.keys.borrow_mut().push(*key);
            return true;
        }
        self.core().run_post_bindings(key)
    }

    fn dispatch_mouse(&self, event: MouseEvent) {
        self.mice.borrow_mut().push(event);
    }

    fn cursor_visible(&self) -> bool {
        self.cursor.get().is_some()
    }

    fn cursor_loc(&self) -> Pos {
        self.cursor.get().unwrap_or_default()
    }
}
