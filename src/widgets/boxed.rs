//! Linear container: children stacked along one axis.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::container::{destroy_container, Container};
use super::core::{same_widget, KeyConnection, Widget, WidgetCore, WidgetExt, WidgetRef};
use super::passthrough::{self, Passthrough};
use crate::config::keybindings::Keybindings;
use crate::ui::core::canvas::Canvas;
use crate::ui::core::geom::{Pos, Rect, Size};
use crate::ui::core::input::{Key, MouseEvent};
use crate::ui::core::layout::Axis;
use crate::ui::core::style::Style;

struct Slot {
    widget: WidgetRef,
    expand: bool,
}

/// Children laid out in insertion order along `axis`.
///
/// Every visible child gets the full cross-axis extent and its requested
/// main-axis extent, clipped to what is left. Children added with `expand`
/// share the leftover space equally; without any, the leftover stays unused.
/// Hidden children get the empty rectangle.
pub struct Boxed {
    core: WidgetCore,
    me: Weak<Boxed>,
    axis: Axis,
    slots: RefCell<Vec<Slot>>,
    /// Child chosen with `set_focus_widget`.
    chosen: RefCell<Option<WidgetRef>>,
    /// Child currently holding focus on our behalf.
    focused_child: RefCell<Option<WidgetRef>>,
}

impl Boxed {
    pub fn new(axis: Axis) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: WidgetCore::new(this.clone()),
            me: this.clone(),
            axis,
            slots: RefCell::new(Vec::new()),
            chosen: RefCell::new(None),
            focused_child: RefCell::new(None),
        })
    }

    pub fn vertical() -> Rc<Self> {
        Self::new(Axis::Vertical)
    }

    pub fn horizontal() -> Rc<Self> {
        Self::new(Axis::Horizontal)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn add_widget_opts(&self, widget: WidgetRef, expand: bool) {
        self.slots.borrow_mut().push(Slot {
            widget: widget.clone(),
            expand,
        });
        widget.set_owner(self.this().as_ref());
        self.sync_focus();
        if widget.is_visible() {
            self.request_relayout();
        }
    }

    /// Routes keys to `widget` while it is visible and accepts focus.
    pub fn set_focus_widget(&self, widget: &WidgetRef) {
        if self.index_of(widget).is_none() {
            return;
        }
        *self.chosen.borrow_mut() = Some(widget.clone());
        self.sync_focus();
    }

    /// Moves focus to the next visible child that accepts it, wrapping.
    pub fn cycle_focus(&self) {
        let children = self.children();
        if children.is_empty() {
            return;
        }
        let start = self
            .focus_target()
            .and_then(|t| children.iter().position(|c| same_widget(c, &t)));
        let n = children.len();
        let order = (1..=n).map(|step| match start {
            Some(s) => (s + step) % n,
            None => step - 1,
        });
        let next = order
            .map(|idx| &children[idx])
            .find(|c| c.is_visible() && c.focus_me())
            .cloned();
        if let Some(next) = next {
            self.set_focus_widget(&next);
        }
    }

    /// Makes the "Cycle" action in `bindings` move focus between children.
    pub fn bind_cycle(&self, bindings: &Rc<Keybindings>) -> KeyConnection {
        let me = self.me.clone();
        self.connect_key_post("Cycle", bindings, move || {
            if let Some(boxed) = me.upgrade() {
                boxed.cycle_focus();
            }
        })
    }

    fn index_of(&self, widget: &WidgetRef) -> Option<usize> {
        self.slots
            .borrow()
            .iter()
            .position(|s| same_widget(&s.widget, widget))
    }

    /// Hands focus to the current target if we have focus, taking it back
    /// from whichever child held it before.
    fn sync_focus(&self) {
        let want = if self.has_focus() {
            self.focus_target()
        } else {
            None
        };
        let had = self.focused_child.borrow().clone();
        let unchanged = match (&had, &want) {
            (Some(a), Some(b)) => same_widget(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        *self.focused_child.borrow_mut() = want.clone();
        if let Some(old) = had {
            old.unfocus();
        }
        if let Some(new) = want {
            new.focus();
        }
    }

    /// Main-axis extent of every child, in order, inside `total` cells;
    /// `cross` is the cross-axis extent.
    fn main_lengths(&self, total: u16, cross: u16) -> Vec<u16> {
        let slots = self.slots.borrow();
        let requests: Vec<Option<u16>> = slots
            .iter()
            .map(|s| {
                s.widget.is_visible().then(|| match self.axis {
                    Axis::Vertical => s.widget.height_request(cross),
                    Axis::Horizontal => s.widget.width_request(),
                })
            })
            .collect();

        let requested = requests
            .iter()
            .flatten()
            .fold(0u16, |acc, r| acc.saturating_add(*r));
        let leftover = total.saturating_sub(requested);
        let expanders = slots
            .iter()
            .filter(|s| s.expand && s.widget.is_visible())
            .count() as u16;
        let (share, mut extra) = match expanders {
            0 => (0, 0),
            n => (leftover / n, leftover % n),
        };

        let mut remaining = total;
        slots
            .iter()
            .zip(requests)
            .map(|(slot, request)| {
                let Some(request) = request else {
                    return 0;
                };
                let mut want = request;
                if slot.expand {
                    want = want.saturating_add(share);
                    if extra > 0 {
                        want = want.saturating_add(1);
                        extra -= 1;
                    }
                }
                let len = want.min(remaining);
                remaining -= len;
                len
            })
            .collect()
    }
}

impl Widget for Boxed {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn width_request(&self) -> u16 {
        let visible = self.children().into_iter().filter(|c| c.is_visible());
        match self.axis {
            Axis::Vertical => visible.map(|c| c.width_request()).max().unwrap_or(0),
            Axis::Horizontal => visible.fold(0u16, |acc, c| acc.saturating_add(c.width_request())),
        }
    }

    fn height_request(&self, width: u16) -> u16 {
        match self.axis {
            Axis::Vertical => self
                .children()
                .into_iter()
                .filter(|c| c.is_visible())
                .fold(0u16, |acc, c| acc.saturating_add(c.height_request(width))),
            Axis::Horizontal => {
                let widths = self.main_lengths(width, 0);
                self.children()
                    .iter()
                    .zip(widths)
                    .filter(|(c, _)| c.is_visible())
                    .map(|(c, w)| c.height_request(w))
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    fn layout(&self) {
        let size = self.geometry().size();
        let cross = self.axis.cross(size);
        let lengths = self.main_lengths(self.axis.main(size), cross);
        let mut offset = 0u16;
        for (child, len) in self.children().into_iter().zip(lengths) {
            if !child.is_visible() {
                child.alloc_size(Rect::ZERO);
                continue;
            }
            let Size { w, h } = self.axis.size(len, cross);
            let rect = match self.axis {
                Axis::Vertical => Rect::new(0, offset, w, h),
                Axis::Horizontal => Rect::new(offset, 0, w, h),
            };
            child.alloc_size(rect);
            offset = offset.saturating_add(len);
        }
    }

    fn paint(&self, canvas: &mut Canvas<'_>, style: Style) {
        for child in self.children() {
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

    fn focus_changed(&self, _focused: bool) {
        self.sync_focus();
    }

    fn show_all(&self) {
        if self.is_destroyed() {
            return;
        }
        for child in self.children() {
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

impl Container for Boxed {
    fn add_widget(&self, widget: WidgetRef) {
        self.add_widget_opts(widget, false);
    }

    fn rem_widget(&self, widget: &WidgetRef) {
        let Some(idx) = self.index_of(widget) else {
            return;
        };
        self.slots.borrow_mut().remove(idx);
        let was_chosen = self
            .chosen
            .borrow()
            .as_ref()
            .is_some_and(|c| same_widget(c, widget));
        if was_chosen {
            *self.chosen.borrow_mut() = None;
        }
        widget.set_owner(None);
        self.sync_focus();
        widget.unfocus();
        self.request_relayout();
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.slots.borrow().iter().map(|s| s.widget.clone()).collect()
    }

    fn active_widget(&self) -> Option<WidgetRef> {
        self.focus_target()
    }

    fn child_shown(&self, _child: &WidgetRef) {
        self.sync_focus();
        self.request_relayout();
    }

    fn child_hidden(&self, _child: &WidgetRef) {
        self.sync_focus();
        self.request_relayout();
    }
}

impl Passthrough for Boxed {
    /// The chosen child while it is usable, otherwise the first visible child
    /// that accepts focus.
    fn focus_target(&self) -> Option<WidgetRef> {
        let usable = |c: &WidgetRef| c.is_visible() && c.focus_me();
        if let Some(chosen) = self.chosen.borrow().clone().filter(|c| usable(c)) {
            return Some(chosen);
        }
        self.children().into_iter().find(|c| usable(c))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/boxed.rs"]
mod tests;
