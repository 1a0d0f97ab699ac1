use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::container::{destroy_container, Container};
use super::core::{same_widget, Widget, WidgetCore, WidgetExt, WidgetRef};
use super::passthrough::{self, Passthrough};
use crate::ui::core::canvas::Canvas;
use crate::ui::core::geom::{Pos, Rect, Size};
use crate::ui::core::input::{Key, MouseEvent};
use crate::ui::core::style::Style;

/// Overlapping children in z-order.
///
/// The first child is on top. Every child is allocated the whole area and
/// children are painted back to front. Showing a child raises it. Only the
/// top child can hold focus, and only while it is visible and wants it.
pub struct Stacked {
    core: WidgetCore,
    request: Size,
    children: RefCell<Vec<WidgetRef>>,
    raise_on_show: Cell<bool>,
}

impl Stacked {
    /// `width`/`height` are the fixed size requests of the stack.
    pub fn new(width: u16, height: u16) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: WidgetCore::new(this.clone()),
            request: Size::new(width, height),
            children: RefCell::new(Vec::new()),
            raise_on_show: Cell::new(true),
        })
    }

    fn position(&self, widget: &WidgetRef) -> Option<usize> {
        self.children
            .borrow()
            .iter()
            .position(|c| same_widget(c, widget))
    }

    fn restack(&self, widget: &WidgetRef, to_top: bool) {
        let Some(idx) = self.position(widget) else {
            return;
        };
        passthrough::defocus(self);
        {
            let mut children = self.children.borrow_mut();
            let child = children.remove(idx);
            if to_top {
                children.insert(0, child);
            } else {
                children.push(child);
            }
        }
        passthrough::refocus(self);
        self.request_redraw();
    }

    pub fn raise_widget(&self, widget: &WidgetRef) {
        self.restack(widget, true);
    }

    pub fn lower_widget(&self, widget: &WidgetRef) {
        self.restack(widget, false);
    }

    pub fn top(&self) -> Option<WidgetRef> {
        self.children.borrow().first().cloned()
    }
}

impl Widget for Stacked {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn width_request(&self) -> u16 {
        self.request.w
    }

    fn height_request(&self, _width: u16) -> u16 {
        self.request.h
    }

    fn layout(&self) {
        let area = Rect::from_size(self.geometry().size());
        for child in self.children() {
            child.alloc_size(if child.is_visible() { area } else { Rect::ZERO });
        }
    }

    fn paint(&self, canvas: &mut Canvas<'_>, style: Style) {
        for child in self.children().iter().rev() {
            if child.is_visible() {
                child.display(canvas, style);
            }
        }
    }

    fn focus_me(&self) -> bool {
        passthrough::focus_me(self)
    }

    fn handle_key(&self, key: &Key) -> bool {
        passthrough::handle_key(self, key)
    }

    fn dispatch_mouse(&self, event: MouseEvent) {
        let at = Pos::new(event.column, event.row);
        let hit = self
            .children()
            .into_iter()
            .find(|c| c.is_visible() && c.geometry().contains(at));
        if let Some(child) = hit {
            let origin = child.geometry().origin();
            if let Some(event) = event.translated(origin.x, origin.y) {
                child.dispatch_mouse(event);
            }
        }
    }

    fn cursor_visible(&self) -> bool {
        passthrough::cursor_visible(self)
    }

    fn cursor_loc(&self) -> Pos {
        passthrough::cursor_loc(self)
    }

    fn focus_changed(&self, focused: bool) {
        passthrough::focus_changed(self, focused);
    }

    /// Shows every child without reordering the stack.
    fn show_all(&self) {
        if self.is_destroyed() {
            return;
        }
        passthrough::defocus(self);
        self.raise_on_show.set(false);
        for child in self.children() {
            child.show_all();
        }
        self.raise_on_show.set(true);
        self.show();
        passthrough::refocus(self);
    }

    fn destroy(&self) {
        destroy_container(self);
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Container for Stacked {
    fn add_widget(&self, widget: WidgetRef) {
        passthrough::defocus(self);
        self.children.borrow_mut().push(widget.clone());
        widget.set_owner(self.this().as_ref());
        passthrough::refocus(self);
        if widget.is_visible() {
            self.request_relayout();
        }
    }

    fn rem_widget(&self, widget: &WidgetRef) {
        let Some(idx) = self.position(widget) else {
            return;
        };
        self.children.borrow_mut().remove(idx);
        widget.set_owner(None);
        if widget.is_visible() {
            self.request_redraw();
        }
        widget.unfocus();
        passthrough::refocus(self);
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.children.borrow().clone()
    }

    fn active_widget(&self) -> Option<WidgetRef> {
        self.focus_target()
    }

    fn child_shown(&self, child: &WidgetRef) {
        if self.raise_on_show.get() {
            self.raise_widget(child);
        }
    }

    fn child_hidden(&self, _child: &WidgetRef) {
        self.request_redraw();
    }
}

impl Passthrough for Stacked {
    fn focus_target(&self) -> Option<WidgetRef> {
        self.top().filter(|c| c.is_visible() && c.focus_me())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/stacked.rs"]
mod tests;
