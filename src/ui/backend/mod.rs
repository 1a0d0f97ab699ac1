//! Rendering backends.
//!
//! The runtime talks to the terminal only through `Backend`, which keeps the
//! widget tree independent of `ratatui` and `crossterm` types and lets tests
//! run against an in-memory surface.

use std::io;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::ui::core::geom::{Pos, Rect, Size};
use crate::ui::core::input::InputEvent;
use crate::ui::core::painter::PaintCmd;
use crate::ui::core::style::Style;

pub trait Backend {
    /// Size recorded by the last `refresh_size`.
    fn size(&self) -> Size;

    /// Re-queries the surface size after a resize notification.
    fn refresh_size(&mut self) -> io::Result<Size>;

    /// Forgets what is on screen so the next flush repaints every cell.
    fn clear(&mut self) -> io::Result<()>;

    fn draw(&mut self, cmds: &[PaintCmd]);

    fn set_cursor(&mut self, pos: Option<Pos>);

    fn flush(&mut self) -> io::Result<()>;

    /// Returns the next pending input event without blocking. Main thread only.
    fn read_input(&mut self) -> io::Result<Option<InputEvent>>;

    /// Hands the terminal back to the shell.
    fn suspend(&mut self) -> io::Result<()>;

    fn resume(&mut self) -> io::Result<()>;
}

/// Cell storage a backend rasterises paint commands into.
pub(crate) trait CellSink {
    fn area(&self) -> Rect;

    fn put(&mut self, x: u16, y: u16, symbol: &str, style: Style);

    fn restyle(&mut self, x: u16, y: u16, style: Style);
}

pub(crate) fn rasterize(sink: &mut dyn CellSink, cmds: &[PaintCmd]) {
    let bounds = sink.area();
    for cmd in cmds {
        match cmd {
            PaintCmd::Fill { rect, style } => {
                for_each_cell(rect.intersect(bounds), |x, y| sink.put(x, y, " ", *style))
            }
            PaintCmd::Restyle { rect, style } => {
                for_each_cell(rect.intersect(bounds), |x, y| sink.restyle(x, y, *style))
            }
            PaintCmd::HLine { pos, len, ch, style } => {
                let symbol = ch.to_string();
                let rect = Rect::new(pos.x, pos.y, *len, 1).intersect(bounds);
                for_each_cell(rect, |x, y| sink.put(x, y, &symbol, *style));
            }
            PaintCmd::VLine { pos, len, ch, style } => {
                let symbol = ch.to_string();
                let rect = Rect::new(pos.x, pos.y, 1, *len).intersect(bounds);
                for_each_cell(rect, |x, y| sink.put(x, y, &symbol, *style));
            }
            PaintCmd::Text {
                pos,
                text,
                style,
                clip,
            } => draw_text(sink, *pos, text, *style, clip.intersect(bounds)),
        }
    }
}

fn for_each_cell(rect: Rect, mut f: impl FnMut(u16, u16)) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            f(x, y);
        }
    }
}

fn draw_text(sink: &mut dyn CellSink, pos: Pos, text: &str, style: Style, clip: Rect) {
    if clip.is_empty() || pos.y < clip.y || pos.y >= clip.bottom() {
        return;
    }
    let y = pos.y;
    let mut x = pos.x;
    for g in text.graphemes(true) {
        let w = UnicodeWidthStr::width(g) as u16;
        if w == 0 {
            continue;
        }
        if x >= clip.right() {
            break;
        }
        // A wide glyph is drawn whole or not at all.
        if w > 1 && x.saturating_add(w) > clip.right() {
            break;
        }
        if x >= clip.x {
            sink.put(x, y, g, style);
            for dx in 1..w {
                sink.put(x + dx, y, " ", style);
            }
        }
        x = x.saturating_add(w);
    }
}


#[cfg(feature = "tui")]
pub mod terminal;
#[cfg(feature = "tui")]
pub mod terminal_guard;
