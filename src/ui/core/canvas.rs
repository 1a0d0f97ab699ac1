use super::geom::{Pos, Rect, Size};
use super::painter::{PaintCmd, Painter};
use super::style::Style;
use crate::config::styles::Styles;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderKind {
    #[default]
    Plain,
    Double,
}

impl BorderKind {
    fn glyphs(self) -> [char; 6] {
        match self {
            BorderKind::Plain => ['┌', '┐', '└', '┘', '─', '│'],
            BorderKind::Double => ['╔', '╗', '╚', '╝', '═', '║'],
        }
    }
}

/// Drawing surface handed to `Widget::paint`.
///
/// Coordinates passed to the drawing methods are relative to the widget's
/// own allocation. Everything is clipped to the intersection of that
/// allocation with every ancestor's, so a widget cannot draw outside itself.
pub struct Canvas<'p> {
    area: Rect,
    clip: Rect,
    painter: &'p mut Painter,
    styles: Option<&'p Styles>,
}

impl<'p> Canvas<'p> {
    pub fn new(painter: &'p mut Painter, area: Rect) -> Self {
        Self {
            area,
            clip: area,
            painter,
            styles: None,
        }
    }

    /// Canvas whose `style` lookups resolve against `styles`.
    pub fn with_styles(painter: &'p mut Painter, area: Rect, styles: &'p Styles) -> Self {
        Self {
            styles: Some(styles),
            ..Self::new(painter, area)
        }
    }

    /// Named style; unknown names and style-less canvases give the default.
    pub fn style(&self, name: &str) -> Style {
        self.styles.map(|s| s.get(name)).unwrap_or_default()
    }

    /// Canvas for a child allocated at `rect`, relative to this canvas.
    pub fn child(&mut self, rect: Rect) -> Canvas<'_> {
        let area = rect.offset(self.area.origin());
        Canvas {
            area,
            clip: area.intersect(self.clip),
            painter: &mut *self.painter,
            styles: self.styles,
        }
    }

    pub fn size(&self) -> Size {
        self.area.size()
    }

    /// Absolute area on the surface.
    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn is_clipped_out(&self) -> bool {
        self.clip.is_empty()
    }

    fn absolute(&self, rect: Rect) -> Rect {
        rect.offset(self.area.origin()).intersect(self.clip)
    }

    pub fn fill(&mut self, rect: Rect, style: Style) {
        let rect = self.absolute(rect);
        if !rect.is_empty() {
            self.painter.push(PaintCmd::Fill { rect, style });
        }
    }

    /// Blanks the whole canvas with `style`.
    pub fn erase(&mut self, style: Style) {
        self.fill(Rect::from_size(self.size()), style);
    }

    pub fn restyle(&mut self, rect: Rect, style: Style) {
        let rect = self.absolute(rect);
        if !rect.is_empty() {
            self.painter.push(PaintCmd::Restyle { rect, style });
        }
    }

    pub fn text(&mut self, x: u16, y: u16, text: impl Into<String>, style: Style) {
        let pos = Pos::new(x, y).offset(self.area.origin());
        if self.clip.is_empty() || pos.y < self.clip.y || pos.y >= self.clip.bottom() {
            return;
        }
        self.painter.push(PaintCmd::Text {
            pos,
            text: text.into(),
            style,
            clip: self.clip,
        });
    }

    pub fn hline(&mut self, x: u16, y: u16, len: u16, ch: char, style: Style) {
        let rect = self.absolute(Rect::new(x, y, len, 1));
        if !rect.is_empty() {
            self.painter.push(PaintCmd::HLine {
                pos: rect.origin(),
                len: rect.w,
                ch,
                style,
            });
        }
    }

    pub fn vline(&mut self, x: u16, y: u16, len: u16, ch: char, style: Style) {
        let rect = self.absolute(Rect::new(x, y, 1, len));
        if !rect.is_empty() {
            self.painter.push(PaintCmd::VLine {
                pos: rect.origin(),
                len: rect.h,
                ch,
                style,
            });
        }
    }

    /// Draws a box along the edges of the canvas. Needs at least 2x2 cells.
    pub fn border(&mut self, style: Style, kind: BorderKind) {
        let Size { w, h } = self.size();
        if w < 2 || h < 2 {
            return;
        }
        let [tl, tr, bl, br, horiz, vert] = kind.glyphs();
        let (right, bottom) = (w - 1, h - 1);
        self.hline(1, 0, w - 2, horiz, style);
        self.hline(1, bottom, w - 2, horiz, style);
        self.vline(0, 1, h - 2, vert, style);
        self.vline(right, 1, h - 2, vert, style);
        for (x, y, ch) in [(0, 0, tl), (right, 0, tr), (0, bottom, bl), (right, bottom, br)] {
            self.hline(x, y, 1, ch, style);
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/ui/core/canvas.rs"]
mod tests;
