//! The widget base node.
//!
//! Widgets are shared as `Rc<dyn Widget>` and live on the main thread. A
//! container holds strong references to its children; a child only keeps a
//! weak back-reference to its owner, so the tree never forms an ownership
//! cycle. Every piece of mutable base state sits in a `Cell`/`RefCell` inside
//! [`WidgetCore`], and no borrow of it is held while calling into another
//! widget or an observer.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::container::Container;
use super::signal::{Connection, Disconnect, Signal, SlotList};
use crate::config::keybindings::Keybindings;
use crate::runtime::Handle;
use crate::ui::core::canvas::Canvas;
use crate::ui::core::geom::{Pos, Rect};
use crate::ui::core::input::{Key, MouseEvent};
use crate::ui::core::style::Style;

pub type WidgetRef = Rc<dyn Widget>;

/// Revocation token returned by [`WidgetExt::connect_key`].
pub type KeyConnection = Connection;

#[derive(Clone)]
struct KeyBinding {
    action: String,
    bindings: Rc<Keybindings>,
    slot: Rc<dyn Fn()>,
}

#[derive(Default)]
pub struct WidgetSignals {
    pub shown: Signal<()>,
    pub hidden: Signal<()>,
    pub destroyed: Signal<()>,
    pub focus_changed: Signal<bool>,
}

pub struct WidgetCore {
    this: Weak<dyn Widget>,
    owner: RefCell<Option<Weak<dyn Widget>>>,
    /// Allocation, relative to the owner.
    geom: Cell<Rect>,
    visible: Cell<bool>,
    focused: Cell<bool>,
    destroyed: Cell<bool>,
    bg_style: Cell<Style>,
    opaque: Cell<bool>,
    toplevel: RefCell<Option<Handle>>,
    pre_keys: Rc<SlotList<KeyBinding>>,
    post_keys: Rc<SlotList<KeyBinding>>,
    signals: WidgetSignals,
}

impl WidgetCore {
    /// `this` is the weak self-reference handed out by `Rc::new_cyclic`.
    pub fn new(this: Weak<dyn Widget>) -> Self {
        Self {
            this,
            owner: RefCell::new(None),
            geom: Cell::new(Rect::ZERO),
            visible: Cell::new(false),
            focused: Cell::new(false),
            destroyed: Cell::new(false),
            bg_style: Cell::new(Style::default()),
            opaque: Cell::new(true),
            toplevel: RefCell::new(None),
            pre_keys: Rc::new(SlotList::new()),
            post_keys: Rc::new(SlotList::new()),
            signals: WidgetSignals::default(),
        }
    }

    /// Strong reference to the widget owning this core; `None` while it is
    /// being dropped.
    pub fn this(&self) -> Option<WidgetRef> {
        self.this.upgrade()
    }

    pub fn owner(&self) -> Option<WidgetRef> {
        self.owner.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn geometry(&self) -> Rect {
        self.geom.get()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn has_focus(&self) -> bool {
        self.focused.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub fn bg_style(&self) -> Style {
        self.bg_style.get()
    }

    /// Whether `display` erases the allocation before painting.
    pub fn is_opaque(&self) -> bool {
        self.opaque.get()
    }

    pub fn signals(&self) -> &WidgetSignals {
        &self.signals
    }

    pub fn has_pre_bindings(&self) -> bool {
        !self.pre_keys.is_empty()
    }

    /// Runtime handle of the tree this widget is attached to, found by
    /// climbing to the root.
    pub fn handle(&self) -> Option<Handle> {
        if let Some(handle) = self.toplevel.borrow().as_ref() {
            return Some(handle.clone());
        }
        self.owner().and_then(|owner| owner.core().handle())
    }

    pub(crate) fn set_toplevel(&self, handle: Option<Handle>) {
        *self.toplevel.borrow_mut() = handle;
    }

    pub fn request_relayout(&self) {
        if let Some(handle) = self.handle() {
            handle.request_relayout();
        }
    }

    pub fn request_redraw(&self) {
        if let Some(handle) = self.handle() {
            handle.request_redraw();
        }
    }

    pub fn request_cursor_update(&self) {
        if let Some(handle) = self.handle() {
            handle.request_cursor_update();
        }
    }

    /// Runs the post-bindings matching `key`; true if any ran.
    pub fn run_post_bindings(&self, key: &Key) -> bool {
        run_bindings(&self.post_keys, key)
    }

    fn connect(list: &Rc<SlotList<KeyBinding>>, binding: KeyBinding) -> KeyConnection {
        let id = list.insert(binding);
        let erased: Rc<dyn Disconnect> = list.clone();
        Connection::new(Rc::downgrade(&erased), id)
    }
}

fn run_bindings(list: &SlotList<KeyBinding>, key: &Key) -> bool {
    let mut ran = false;
    for binding in list.snapshot() {
        if binding.bindings.key_matches(key, &binding.action) {
            (binding.slot)();
            ran = true;
        }
    }
    ran
}

/// A node of the widget tree.
///
/// Implementors provide the two-pass size negotiation (`width_request`, then
/// `height_request` for a given width), `layout` to place children inside the
/// current allocation, and `paint`. The remaining methods have base
/// behaviour that containers override to delegate to a child.
pub trait Widget: 'static {
    fn core(&self) -> &WidgetCore;

    /// Preferred width. Must not have side effects.
    fn width_request(&self) -> u16;

    /// Preferred height when given `width` columns. Must not have side effects.
    fn height_request(&self, width: u16) -> u16;

    /// Draws the widget into its own canvas.
    fn paint(&self, canvas: &mut Canvas<'_>, style: Style);

    /// Places children inside the current allocation.
    fn layout(&self) {}

    /// Whether the widget accepts keyboard focus. By default a widget does
    /// when it has pre-bindings.
    fn focus_me(&self) -> bool {
        let core = self.core();
        !core.is_destroyed() && core.has_pre_bindings()
    }

    /// Called by `dispatch_key` after the pre-bindings ran.
    fn handle_key(&self, key: &Key) -> bool {
        let core = self.core();
        !core.is_destroyed() && core.run_post_bindings(key)
    }

    /// Coordinates are relative to this widget.
    fn dispatch_mouse(&self, _event: MouseEvent) {}

    fn cursor_visible(&self) -> bool {
        false
    }

    /// Cursor position relative to this widget.
    fn cursor_loc(&self) -> Pos {
        Pos::default()
    }

    /// Hook run when the focus flag changes, before observers are notified.
    fn focus_changed(&self, _focused: bool) {}

    fn show_all(&self) {
        if !self.core().is_destroyed() {
            self.show();
        }
    }

    /// Idempotent. Containers destroy their children first and then call
    /// [`destroy_base`].
    fn destroy(&self) {
        destroy_base(self);
    }

    fn as_container(&self) -> Option<&dyn Container> {
        None
    }
}

/// Base destroy step: hide, detach from the owner, mark destroyed, notify.
pub fn destroy_base<W: Widget + ?Sized>(widget: &W) {
    let core = widget.core();
    if core.is_destroyed() {
        return;
    }
    let Some(me) = core.this() else {
        core.destroyed.set(true);
        return;
    };

    widget.hide();
    if let Some(owner) = core.owner() {
        if let Some(container) = owner.as_container() {
            container.rem_widget(&me);
        }
    }
    // Set last so that the owner's removal path still sees a live widget.
    core.destroyed.set(true);
    tracing::trace!("widget destroyed");
    core.signals.destroyed.emit(&());
}

/// Operations shared by every widget.
pub trait WidgetExt: Widget {
    fn this(&self) -> Option<WidgetRef> {
        self.core().this()
    }

    fn owner(&self) -> Option<WidgetRef> {
        self.core().owner()
    }

    fn geometry(&self) -> Rect {
        self.core().geometry()
    }

    fn is_visible(&self) -> bool {
        self.core().is_visible()
    }

    fn has_focus(&self) -> bool {
        self.core().has_focus()
    }

    fn is_destroyed(&self) -> bool {
        self.core().is_destroyed()
    }

    fn show(&self) {
        let core = self.core();
        if core.is_destroyed() {
            return;
        }
        let _keep = core.this();
        let changed = !core.visible.replace(true);
        if let (Some(owner), Some(me)) = (core.owner(), core.this()) {
            if let Some(container) = owner.as_container() {
                container.child_shown(&me);
            }
        }
        core.signals.shown.emit(&());
        if changed {
            core.request_relayout();
        }
    }

    fn hide(&self) {
        let core = self.core();
        if core.is_destroyed() {
            return;
        }
        let _keep = core.this();
        let changed = core.visible.replace(false);
        if let (Some(owner), Some(me)) = (core.owner(), core.this()) {
            if let Some(container) = owner.as_container() {
                container.child_hidden(&me);
            }
        }
        core.signals.hidden.emit(&());
        if changed {
            core.request_relayout();
        }
    }

    fn set_visible(&self, visible: bool) {
        if visible {
            self.show();
        } else {
            self.hide();
        }
    }

    /// Attaches to (or detaches from) a container. The allocation is reset
    /// until the new owner lays the widget out.
    fn set_owner(&self, owner: Option<&WidgetRef>) {
        let core = self.core();
        *core.owner.borrow_mut() = owner.map(Rc::downgrade);
        self.alloc_size(Rect::ZERO);
    }

    /// Assigns the allocation (relative to the owner) and lays out children.
    fn alloc_size(&self, rect: Rect) {
        let core = self.core();
        if core.is_destroyed() {
            return;
        }
        core.geom.set(rect);
        self.layout();
    }

    /// Paints the widget into its allocation inside `parent`, the owner's
    /// canvas. `style` is the surrounding style; the background style is
    /// layered over it.
    fn display(&self, parent: &mut Canvas<'_>, style: Style) {
        let core = self.core();
        if core.is_destroyed() {
            return;
        }
        let mut canvas = parent.child(core.geometry());
        if canvas.is_clipped_out() {
            return;
        }
        let style = style.patch(core.bg_style());
        if core.is_opaque() {
            canvas.erase(style);
        }
        self.paint(&mut canvas, style);
    }

    /// Runs the matching pre-bindings, then `handle_key`.
    fn dispatch_key(&self, key: &Key) -> bool {
        let core = self.core();
        if core.is_destroyed() {
            return false;
        }
        let _keep = core.this();
        let ran = run_bindings(&core.pre_keys, key);
        ran || self.handle_key(key)
    }

    fn focus(&self) {
        let core = self.core();
        if core.is_destroyed() || core.focused.replace(true) {
            return;
        }
        self.focus_changed(true);
        core.signals.focus_changed.emit(&true);
        core.request_cursor_update();
    }

    fn unfocus(&self) {
        let core = self.core();
        if !core.focused.replace(false) {
            return;
        }
        self.focus_changed(false);
        core.signals.focus_changed.emit(&false);
        core.request_cursor_update();
    }

    fn set_bg_style(&self, style: Style) {
        self.core().bg_style.set(style);
        self.core().request_redraw();
    }

    fn set_opaque(&self, opaque: bool) {
        self.core().opaque.set(opaque);
    }

    /// Binds `action` in `bindings` to `slot`, run before `handle_key`. A
    /// widget with such bindings accepts focus.
    fn connect_key(
        &self,
        action: &str,
        bindings: &Rc<Keybindings>,
        slot: impl Fn() + 'static,
    ) -> KeyConnection {
        WidgetCore::connect(
            &self.core().pre_keys,
            KeyBinding {
                action: action.to_string(),
                bindings: Rc::clone(bindings),
                slot: Rc::new(slot),
            },
        )
    }

    /// Like `connect_key`, but run from the base `handle_key`, after the
    /// widget's own key handling had its chance.
    fn connect_key_post(
        &self,
        action: &str,
        bindings: &Rc<Keybindings>,
        slot: impl Fn() + 'static,
    ) -> KeyConnection {
        WidgetCore::connect(
            &self.core().post_keys,
            KeyBinding {
                action: action.to_string(),
                bindings: Rc::clone(bindings),
                slot: Rc::new(slot),
            },
        )
    }

    fn on_shown(&self, slot: impl Fn() + 'static) -> Connection {
        self.core().signals.shown.connect(move |_| slot())
    }

    fn on_hidden(&self, slot: impl Fn() + 'static) -> Connection {
        self.core().signals.hidden.connect(move |_| slot())
    }

    fn on_destroyed(&self, slot: impl Fn() + 'static) -> Connection {
        self.core().signals.destroyed.connect(move |_| slot())
    }

    fn on_focus_changed(&self, slot: impl Fn(bool) + 'static) -> Connection {
        self.core()
            .signals
            .focus_changed
            .connect(move |focused| slot(*focused))
    }

    fn request_relayout(&self) {
        self.core().request_relayout();
    }

    fn request_redraw(&self) {
        self.core().request_redraw();
    }
}

impl<W: Widget + ?Sized> WidgetExt for W {}

/// Identity comparison of two widget references.
pub fn same_widget(a: &WidgetRef, b: &WidgetRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/core.rs"]
mod tests;
