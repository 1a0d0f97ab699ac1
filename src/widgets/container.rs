use super::core::{destroy_base, Widget, WidgetExt, WidgetRef};

/// A widget owning zero or more children.
///
/// Children are attached with `add_widget`, which makes this container their
/// owner; `rem_widget` detaches them. A child's `show`/`hide` reports back
/// through `child_shown`/`child_hidden`.
pub trait Container: Widget {
    fn add_widget(&self, widget: WidgetRef);

    fn rem_widget(&self, widget: &WidgetRef);

    fn children(&self) -> Vec<WidgetRef>;

    /// Child currently receiving focus, if any.
    fn active_widget(&self) -> Option<WidgetRef>;

    fn child_shown(&self, _child: &WidgetRef) {}

    fn child_hidden(&self, _child: &WidgetRef) {}

    fn add_visible_widget(&self, widget: WidgetRef, visible: bool) {
        self.add_widget(widget.clone());
        widget.set_visible(visible);
    }
}

/// Destroys every child, then the container itself.
///
/// Panics if a child survives its own destruction, which means the
/// container's `rem_widget` did not detach it.
pub fn destroy_container<C: Container + ?Sized>(container: &C) {
    if container.is_destroyed() {
        return;
    }
    let _keep = container.this();
    for child in container.children() {
        child.destroy();
    }
    assert!(
        container.children().is_empty(),
        "container destroyed while still holding children"
    );
    destroy_base(container);
}
