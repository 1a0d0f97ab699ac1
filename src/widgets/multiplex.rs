//! Tab multiplexer: many children, one of them on screen.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::container::{destroy_container, Container};
use super::core::{same_widget, Widget, WidgetCore, WidgetExt, WidgetRef};
use super::passthrough::{self, Passthrough};
use super::signal::{Connection, Signal};
use crate::ui::core::canvas::Canvas;
use crate::ui::core::geom::{Pos, Rect};
use crate::ui::core::input::{Key, MouseEvent, MouseEventKind};
use crate::ui::core::layout::Axis;
use crate::ui::core::style::Style;

const UNTITLED: &str = "Untitled";

struct Tab {
    widget: WidgetRef,
    title: String,
}

/// Span of one tab in the tab row.
struct TabSpan {
    widget: WidgetRef,
    title: String,
    x: u16,
    w: u16,
}

/// Shows exactly one of its visible children, the "visible child".
///
/// Showing a child selects it; hiding the selected child selects the nearest
/// visible child before it, wrapping around. With tabs enabled and at least
/// two visible children, a row of tabs is drawn above the selected child.
pub struct Multiplex {
    core: WidgetCore,
    tabs: RefCell<Vec<Tab>>,
    visible: RefCell<Option<WidgetRef>>,
    show_tabs: Cell<bool>,
    cycled: Signal<()>,
}

impl Multiplex {
    pub fn new(show_tabs: bool) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: WidgetCore::new(this.clone()),
            tabs: RefCell::new(Vec::new()),
            visible: RefCell::new(None),
            show_tabs: Cell::new(show_tabs),
            cycled: Signal::new(),
        })
    }

    pub fn add_widget_titled(&self, widget: WidgetRef, title: impl Into<String>) {
        self.insert_tab(None, widget, title.into());
    }

    /// Inserts `widget` right after `after`, or at the end if `after` is not
    /// a child.
    pub fn add_widget_after(&self, widget: WidgetRef, after: &WidgetRef, title: impl Into<String>) {
        let at = self.index_of(after).map(|idx| idx + 1);
        self.insert_tab(at, widget, title.into());
    }

    fn insert_tab(&self, at: Option<usize>, widget: WidgetRef, title: String) {
        {
            let mut tabs = self.tabs.borrow_mut();
            let tab = Tab {
                widget: widget.clone(),
                title,
            };
            match at {
                Some(idx) => tabs.insert(idx, tab),
                None => tabs.push(tab),
            }
        }
        widget.set_owner(self.this().as_ref());
        if widget.is_visible() {
            self.show_widget(&widget);
        }
    }

    pub fn set_show_tabs(&self, shown: bool) {
        self.show_tabs.set(shown);
        self.request_relayout();
    }

    /// Tabs are drawn only when enabled and at least two children are visible.
    pub fn tabs_visible(&self) -> bool {
        self.show_tabs.get() && self.num_visible() >= 2
    }

    pub fn visible_widget(&self) -> Option<WidgetRef> {
        self.visible.borrow().clone()
    }

    pub fn num_children(&self) -> usize {
        self.tabs.borrow().len()
    }

    pub fn num_visible(&self) -> usize {
        self.tabs
            .borrow()
            .iter()
            .filter(|t| t.widget.is_visible())
            .count()
    }

    pub fn title(&self, widget: &WidgetRef) -> Option<String> {
        let idx = self.index_of(widget)?;
        Some(self.tabs.borrow()[idx].title.clone())
    }

    /// Notified whenever the visible child changes.
    pub fn on_cycled(&self, slot: impl Fn() + 'static) -> Connection {
        self.cycled.connect(move |_| slot())
    }

    /// Makes `widget` the visible child.
    pub fn show_widget(&self, widget: &WidgetRef) {
        if let Some(idx) = self.index_of(widget) {
            let target = self.tabs.borrow()[idx].widget.clone();
            self.select(Some(target));
        }
    }

    /// If `widget` is the visible child, selects the nearest visible child
    /// before it, wrapping around, or nothing.
    pub fn hide_widget(&self, widget: &WidgetRef) {
        let Some(current) = self.visible_index() else {
            return;
        };
        if !same_widget(&self.tabs.borrow()[current].widget, widget) {
            return;
        }
        let next = self.search(current, false);
        self.select(next);
    }

    pub fn cycle_forward(&self) {
        self.cycle(true);
    }

    pub fn cycle_backward(&self) {
        self.cycle(false);
    }

    fn cycle(&self, forward: bool) {
        if self.tabs.borrow().is_empty() {
            return;
        }
        let next = match self.visible_index() {
            Some(current) => self.search(current, forward),
            None => {
                let tabs = self.tabs.borrow();
                let mut visible = tabs.iter().filter(|t| t.widget.is_visible());
                let found = if forward {
                    visible.next()
                } else {
                    visible.last()
                };
                found.map(|t| t.widget.clone())
            }
        };
        if next.is_some() {
            self.select(next);
        }
    }

    /// Nearest visible child other than the one at `from`, wrapping around.
    fn search(&self, from: usize, forward: bool) -> Option<WidgetRef> {
        let tabs = self.tabs.borrow();
        let n = tabs.len();
        (1..n)
            .map(|step| {
                if forward {
                    (from + step) % n
                } else {
                    (from + n - step) % n
                }
            })
            .map(|idx| &tabs[idx].widget)
            .find(|w| w.is_visible())
            .cloned()
    }

    /// Changes the visible child, moving focus along if the multiplex has it.
    fn select(&self, next: Option<WidgetRef>) {
        let old = self.visible_widget();
        let focused = self.has_focus();
        if let Some(old) = &old {
            if focused {
                old.unfocus();
            }
        }
        *self.visible.borrow_mut() = next.clone();
        if let Some(next) = &next {
            if focused {
                next.focus();
            }
        }
        let changed = match (&old, &next) {
            (Some(a), Some(b)) => !same_widget(a, b),
            (None, None) => false,
            _ => true,
        };
        if changed {
            tracing::trace!(visible = ?self.visible_index(), "multiplex cycled");
            self.cycled.emit(&());
            self.request_relayout();
        }
    }

    fn index_of(&self, widget: &WidgetRef) -> Option<usize> {
        self.tabs
            .borrow()
            .iter()
            .position(|t| same_widget(&t.widget, widget))
    }

    fn visible_index(&self) -> Option<usize> {
        let visible = self.visible_widget()?;
        self.index_of(&visible)
    }

    /// Visible children split the row evenly; the rounding remainder goes to
    /// the rightmost tabs.
    fn tab_spans(&self, width: u16) -> Vec<TabSpan> {
        let tabs = self.tabs.borrow();
        let shown: Vec<&Tab> = tabs.iter().filter(|t| t.widget.is_visible()).collect();
        let mut remaining_tabs = shown.len() as u16;
        let mut remaining_w = width;
        let mut x = 0;
        let mut spans = Vec::with_capacity(shown.len());
        for tab in shown {
            let w = remaining_w / remaining_tabs;
            remaining_tabs -= 1;
            remaining_w -= w;
            spans.push(TabSpan {
                widget: tab.widget.clone(),
                title: tab.title.clone(),
                x,
                w,
            });
            x += w;
        }
        spans
    }

    fn paint_tabs(&self, canvas: &mut Canvas<'_>, style: Style) {
        let normal = style.patch(canvas.style("MultiplexTab"));
        let highlighted = style.patch(canvas.style("MultiplexTabHighlighted"));
        let visible = self.visible_widget();
        for span in self.tab_spans(canvas.size().w) {
            let is_visible = visible.as_ref().is_some_and(|v| same_widget(v, &span.widget));
            let style = if is_visible { highlighted } else { normal };
            canvas.fill(Rect::new(span.x, 0, span.w, 1), style);

            let title = truncate_to_width(&span.title, span.w);
            let title_w = title.width() as u16;
            let left = span.w.saturating_sub(title_w) / 2;
            canvas.text(span.x + left, 0, title, style);
        }
    }
}

/// Longest grapheme prefix whose display width fits in `width`.
fn truncate_to_width(text: &str, width: u16) -> &str {
    let mut end = 0;
    for (at, g) in text.grapheme_indices(true) {
        let next = at + g.len();
        if text[..next].width() > width as usize {
            break;
        }
        end = next;
    }
    &text[..end]
}

impl Widget for Multiplex {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn width_request(&self) -> u16 {
        self.children()
            .iter()
            .filter(|c| c.is_visible())
            .map(|c| c.width_request())
            .max()
            .unwrap_or(0)
    }

    fn height_request(&self, width: u16) -> u16 {
        let h = self
            .children()
            .iter()
            .filter(|c| c.is_visible())
            .map(|c| c.height_request(width))
            .max()
            .unwrap_or(0);
        if self.tabs_visible() {
            h.saturating_add(1)
        } else {
            h
        }
    }

    fn layout(&self) {
        let size = self.geometry().size();
        let visible = self.visible_widget();
        let area = if self.tabs_visible() {
            Rect::from_size(size).split(Axis::Vertical, 1).1
        } else {
            Rect::from_size(size)
        };
        for child in self.children() {
            let selected = visible.as_ref().is_some_and(|v| same_widget(v, &child));
            child.alloc_size(if selected { area } else { Rect::ZERO });
        }
    }

    fn paint(&self, canvas: &mut Canvas<'_>, style: Style) {
        if self.tabs_visible() {
            self.paint_tabs(canvas, style);
        }
        if let Some(child) = self.visible_widget() {
            child.display(canvas, style);
        }
    }

    fn focus_me(&self) -> bool {
        passthrough::focus_me(self)
    }

    fn handle_key(&self, key: &Key) -> bool {
        passthrough::handle_key(self, key)
    }

    /// A click on the tab row selects that tab; anything else goes to the
    /// visible child.
    fn dispatch_mouse(&self, event: MouseEvent) {
        if self.tabs_visible() && event.row == 0 {
            if let MouseEventKind::Down(_) = event.kind {
                let width = self.geometry().w;
                let hit = self
                    .tab_spans(width)
                    .into_iter()
                    .find(|s| event.column >= s.x && event.column < s.x + s.w);
                if let Some(span) = hit {
                    self.select(Some(span.widget));
                }
            }
            return;
        }
        if let Some(child) = self.visible_widget() {
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
        self.show();
        if let Some(child) = self.visible_widget() {
            child.show_all();
        }
    }

    fn destroy(&self) {
        destroy_container(self);
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Container for Multiplex {
    fn add_widget(&self, widget: WidgetRef) {
        self.add_widget_titled(widget, UNTITLED);
    }

    fn rem_widget(&self, widget: &WidgetRef) {
        self.hide_widget(widget);
        let Some(idx) = self.index_of(widget) else {
            return;
        };
        self.tabs.borrow_mut().remove(idx);
        widget.set_owner(None);
        self.request_relayout();
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.tabs.borrow().iter().map(|t| t.widget.clone()).collect()
    }

    fn active_widget(&self) -> Option<WidgetRef> {
        self.visible_widget()
    }

    fn child_shown(&self, child: &WidgetRef) {
        self.show_widget(child);
    }

    fn child_hidden(&self, child: &WidgetRef) {
        self.hide_widget(child);
    }
}

impl Passthrough for Multiplex {
    fn focus_target(&self) -> Option<WidgetRef> {
        self.visible_widget()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/multiplex.rs"]
mod tests;
