//! Delegation to a "current" child.
//!
//! A pass-through container forwards focus, keys and cursor queries to the
//! child returned by [`Passthrough::focus_target`]. The free functions here
//! are the delegating implementations; containers call them from their
//! `Widget` impls.

use super::container::Container;
use super::core::{Widget, WidgetExt, WidgetRef};
use crate::ui::core::geom::Pos;
use crate::ui::core::input::Key;

pub trait Passthrough: Container {
    fn focus_target(&self) -> Option<WidgetRef>;
}

/// The target's answer if it accepts focus; otherwise the base rule.
pub fn focus_me<P: Passthrough + ?Sized>(widget: &P) -> bool {
    if widget.focus_target().is_some_and(|t| t.focus_me()) {
        return true;
    }
    let core = widget.core();
    !core.is_destroyed() && core.has_pre_bindings()
}

pub fn cursor_visible<P: Passthrough + ?Sized>(widget: &P) -> bool {
    widget.focus_target().is_some_and(|t| t.cursor_visible())
}

pub fn cursor_loc<P: Passthrough + ?Sized>(widget: &P) -> Pos {
    widget
        .focus_target()
        .map(|t| t.cursor_loc().offset(t.geometry().origin()))
        .unwrap_or_default()
}

/// Keys go to a visible, focusable target first; the container's own
/// post-bindings run when the target does not consume the key.
pub fn handle_key<P: Passthrough + ?Sized>(widget: &P, key: &Key) -> bool {
    let core = widget.core();
    if core.is_destroyed() {
        return false;
    }
    match widget.focus_target() {
        Some(target) if target.is_visible() && target.focus_me() => {
            target.dispatch_key(key) || core.run_post_bindings(key)
        }
        _ => core.run_post_bindings(key),
    }
}

/// Propagates the container's own focus change to the target.
pub fn focus_changed<P: Passthrough + ?Sized>(widget: &P, focused: bool) {
    if let Some(target) = widget.focus_target() {
        if focused {
            target.focus();
        } else {
            target.unfocus();
        }
    }
}

/// Withdraws focus from the current target, ahead of changing it.
pub fn defocus<P: Passthrough + ?Sized>(widget: &P) {
    if let Some(target) = widget.focus_target() {
        target.unfocus();
    }
}

/// Hands focus to the (possibly new) target if the container has it.
pub fn refocus<P: Passthrough + ?Sized>(widget: &P) {
    if widget.has_focus() {
        if let Some(target) = widget.focus_target() {
            target.focus();
        }
    }
}
