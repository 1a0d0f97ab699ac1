//! Single-child containers.
//!
//! A [`Bin`] owns at most one child and delegates focus, keys, mouse and
//! cursor queries to it while it is visible. How the child is measured and
//! placed is decided by the bin's [`BinPolicy`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::container::{destroy_container, Container};
use super::core::{same_widget, Widget, WidgetCore, WidgetExt, WidgetRef};
use super::passthrough::{self, Passthrough};
use crate::ui::core::canvas::{BorderKind, Canvas};
use crate::ui::core::geom::{Pos, Rect, Size};
use crate::ui::core::input::{Key, MouseEvent};
use crate::ui::core::layout::Insets;
use crate::ui::core::style::Style;

pub trait BinPolicy: 'static {
    /// `child` is the bin's child whether or not it is visible.
    fn width_request(&self, child: Option<&WidgetRef>) -> u16;

    fn height_request(&self, child: Option<&WidgetRef>, width: u16) -> u16;

    /// Allocation of a visible child inside a bin of `size`.
    fn child_rect(&self, child: &WidgetRef, size: Size) -> Rect;

    /// Drawn after the child.
    fn decorate(&self, _canvas: &mut Canvas<'_>, _style: Style) {}

    /// Opaque bins erase their allocation before painting.
    fn opaque(&self) -> bool {
        true
    }

    /// Bins that accept focus on their own, regardless of the child.
    fn accepts_focus(&self) -> bool {
        false
    }

    /// Bins that are destroyed by the first key they receive.
    fn destroys_on_key(&self) -> bool {
        false
    }
}

fn visible(child: Option<&WidgetRef>) -> Option<&WidgetRef> {
    child.filter(|c| c.is_visible())
}

/// The child takes the whole area.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fill;

impl BinPolicy for Fill {
    fn width_request(&self, child: Option<&WidgetRef>) -> u16 {
        visible(child).map_or(0, |c| c.width_request())
    }

    fn height_request(&self, child: Option<&WidgetRef>, width: u16) -> u16 {
        visible(child).map_or(0, |c| c.height_request(width))
    }

    fn child_rect(&self, _child: &WidgetRef, size: Size) -> Rect {
        Rect::from_size(size)
    }
}

/// The child keeps its requested size, clamped to the area, and is centred.
#[derive(Debug, Default, Clone, Copy)]
pub struct Center;

impl BinPolicy for Center {
    fn width_request(&self, child: Option<&WidgetRef>) -> u16 {
        Fill.width_request(child)
    }

    fn height_request(&self, child: Option<&WidgetRef>, width: u16) -> u16 {
        Fill.height_request(child, width)
    }

    fn child_rect(&self, child: &WidgetRef, size: Size) -> Rect {
        let w = child.width_request().min(size.w);
        let h = child.height_request(w).min(size.h);
        Rect::from_size(size).centered(w, h)
    }

    fn opaque(&self) -> bool {
        false
    }
}

/// One-cell border around the child.
#[derive(Debug, Default, Clone, Copy)]
pub struct Frame {
    pub kind: BorderKind,
}

impl BinPolicy for Frame {
    fn width_request(&self, child: Option<&WidgetRef>) -> u16 {
        Fill.width_request(child).saturating_add(2)
    }

    fn height_request(&self, child: Option<&WidgetRef>, width: u16) -> u16 {
        if width < 2 {
            return 0;
        }
        Fill.height_request(child, width - 2).saturating_add(2)
    }

    fn child_rect(&self, _child: &WidgetRef, size: Size) -> Rect {
        Rect::from_size(size).inset(Insets::all(1))
    }

    fn decorate(&self, canvas: &mut Canvas<'_>, style: Style) {
        let style = style.patch(canvas.style("Frame"));
        canvas.border(style, self.kind);
    }
}

/// Requests at least `min`, otherwise like [`Fill`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeBox {
    pub min: Size,
}

impl BinPolicy for SizeBox {
    fn width_request(&self, child: Option<&WidgetRef>) -> u16 {
        Fill.width_request(child).max(self.min.w)
    }

    fn height_request(&self, child: Option<&WidgetRef>, width: u16) -> u16 {
        Fill.height_request(child, width).max(self.min.h)
    }

    fn child_rect(&self, _child: &WidgetRef, size: Size) -> Rect {
        Rect::from_size(size)
    }

    fn opaque(&self) -> bool {
        false
    }
}

/// A popup that takes focus and goes away on the next key.
#[derive(Debug, Default, Clone, Copy)]
pub struct Transient;

impl BinPolicy for Transient {
    fn width_request(&self, child: Option<&WidgetRef>) -> u16 {
        Fill.width_request(child)
    }

    fn height_request(&self, child: Option<&WidgetRef>, width: u16) -> u16 {
        Fill.height_request(child, width)
    }

    fn child_rect(&self, _child: &WidgetRef, size: Size) -> Rect {
        Rect::from_size(size)
    }

    fn accepts_focus(&self) -> bool {
        true
    }

    fn destroys_on_key(&self) -> bool {
        true
    }
}

pub struct Bin<P: BinPolicy> {
    core: WidgetCore,
    policy: P,
    child: RefCell<Option<WidgetRef>>,
}

impl<P: BinPolicy> Bin<P> {
    pub fn new(policy: P) -> Rc<Self> {
        let opaque = policy.opaque();
        let bin = Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: WidgetCore::new(this.clone()),
            policy,
            child: RefCell::new(None),
        });
        bin.set_opaque(opaque);
        bin
    }

    pub fn with_child(policy: P, child: WidgetRef) -> Rc<Self> {
        let bin = Self::new(policy);
        bin.add_widget(child);
        bin
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn subwidget(&self) -> Option<WidgetRef> {
        self.child.borrow().clone()
    }

    /// Swaps the child without touching the bin's own visibility.
    pub fn set_subwidget(&self, widget: Option<WidgetRef>) {
        if let Some(old) = self.child.replace(None) {
            old.set_owner(None);
            old.unfocus();
        }
        if let Some(widget) = widget {
            *self.child.borrow_mut() = Some(widget.clone());
            widget.set_owner(self.this().as_ref());
            if self.has_focus() {
                widget.focus();
            }
        }
        self.request_relayout();
    }
}

pub fn fill(child: WidgetRef) -> Rc<Bin<Fill>> {
    Bin::with_child(Fill, child)
}

pub fn center(child: WidgetRef) -> Rc<Bin<Center>> {
    Bin::with_child(Center, child)
}

pub fn frame(child: WidgetRef) -> Rc<Bin<Frame>> {
    Bin::with_child(Frame::default(), child)
}

pub fn size_box(min: Size, child: WidgetRef) -> Rc<Bin<SizeBox>> {
    Bin::with_child(SizeBox { min }, child)
}

pub fn transient(child: WidgetRef) -> Rc<Bin<Transient>> {
    Bin::with_child(Transient, child)
}

impl<P: BinPolicy> Widget for Bin<P> {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn width_request(&self) -> u16 {
        self.policy.width_request(self.subwidget().as_ref())
    }

    fn height_request(&self, width: u16) -> u16 {
        self.policy.height_request(self.subwidget().as_ref(), width)
    }

    fn layout(&self) {
        if let Some(child) = self.subwidget() {
            let rect = if child.is_visible() {
                self.policy.child_rect(&child, self.geometry().size())
            } else {
                Rect::ZERO
            };
            child.alloc_size(rect);
        }
    }

    fn paint(&self, canvas: &mut Canvas<'_>, style: Style) {
        if let Some(child) = self.subwidget().filter(|c| c.is_visible()) {
            child.display(canvas, style);
        }
        self.policy.decorate(canvas, style);
    }

    fn focus_me(&self) -> bool {
        if self.policy.accepts_focus() {
            return !self.is_destroyed();
        }
        passthrough::focus_me(self)
    }

    fn handle_key(&self, key: &Key) -> bool {
        if self.policy.destroys_on_key() {
            self.destroy();
            return true;
        }
        passthrough::handle_key(self, key)
    }

    fn dispatch_mouse(&self, event: MouseEvent) {
        if let Some(child) = self.subwidget().filter(|c| c.is_visible()) {
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

    fn show_all(&self) {
        if self.is_destroyed() {
            return;
        }
        if let Some(child) = self.subwidget() {
            child.show_all();
        }
        self.show();
    }

    fn destroy(&self) {
        destroy_container(self);
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl<P: BinPolicy> Container for Bin<P> {
    /// Panics if the bin already has a child.
    fn add_widget(&self, widget: WidgetRef) {
        assert!(self.child.borrow().is_none(), "bin already has a child");
        let visible = widget.is_visible();
        self.set_subwidget(Some(widget));
        if visible {
            self.show();
        }
    }

    fn rem_widget(&self, widget: &WidgetRef) {
        let is_child = self
            .child
            .borrow()
            .as_ref()
            .is_some_and(|c| same_widget(c, widget));
        if !is_child {
            return;
        }
        self.set_subwidget(None);
        if self.is_visible() {
            self.hide();
        }
        widget.unfocus();
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.subwidget().into_iter().collect()
    }

    fn active_widget(&self) -> Option<WidgetRef> {
        self.subwidget()
    }

    fn child_shown(&self, _child: &WidgetRef) {
        self.show();
    }

    fn child_hidden(&self, _child: &WidgetRef) {
        self.hide();
    }
}

impl<P: BinPolicy> Passthrough for Bin<P> {
    fn focus_target(&self) -> Option<WidgetRef> {
        self.subwidget().filter(|c| c.is_visible())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/bin.rs"]
mod tests;
