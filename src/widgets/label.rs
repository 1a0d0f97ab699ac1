use std::cell::RefCell;
use std::rc::{Rc, Weak};

use unicode_width::UnicodeWidthStr;

use super::core::{Widget, WidgetCore, WidgetExt};
use crate::ui::core::canvas::Canvas;
use crate::ui::core::style::Style;

/// Multi-line text, one row per line, never wrapped.
pub struct Label {
    core: WidgetCore,
    text: RefCell<String>,
    style_name: RefCell<String>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| Self {
            core: WidgetCore::new(this.clone()),
            text: RefCell::new(text.into()),
            style_name: RefCell::new("Label".to_string()),
        })
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = text.into();
        self.request_relayout();
    }

    /// Named style layered over the surrounding style; "Label" by default.
    pub fn set_style_name(&self, name: impl Into<String>) {
        *self.style_name.borrow_mut() = name.into();
        self.request_redraw();
    }
}

impl Widget for Label {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn width_request(&self) -> u16 {
        let widest = self.text.borrow().lines().map(|l| l.width()).max();
        u16::try_from(widest.unwrap_or(0)).unwrap_or(u16::MAX)
    }

    fn height_request(&self, _width: u16) -> u16 {
        u16::try_from(self.text.borrow().lines().count()).unwrap_or(u16::MAX)
    }

    fn paint(&self, canvas: &mut Canvas<'_>, style: Style) {
        let style = style.patch(canvas.style(&self.style_name.borrow()));
        let text = self.text.borrow();
        for (y, line) in text.lines().enumerate().take(canvas.size().h as usize) {
            canvas.text(0, y as u16, line, style);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/label.rs"]
mod tests;
