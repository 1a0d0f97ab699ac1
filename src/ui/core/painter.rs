use super::geom::{Pos, Rect};
use super::style::Style;

/// One drawing operation in absolute surface coordinates. Commands are
/// already clipped by the `Canvas` that produced them, except text, whose
/// glyph widths are only known to the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaintCmd {
    Fill {
        rect: Rect,
        style: Style,
    },
    /// Patch the style of existing cells without changing their symbols.
    Restyle {
        rect: Rect,
        style: Style,
    },
    HLine {
        pos: Pos,
        len: u16,
        ch: char,
        style: Style,
    },
    VLine {
        pos: Pos,
        len: u16,
        ch: char,
        style: Style,
    },
    Text {
        pos: Pos,
        text: String,
        style: Style,
        clip: Rect,
    },
}

/// Command list a frame is recorded into before the backend draws it.
#[derive(Debug, Default)]
pub struct Painter {
    cmds: Vec<PaintCmd>,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn cmds(&self) -> &[PaintCmd] {
        &self.cmds
    }

    pub fn push(&mut self, cmd: PaintCmd) {
        self.cmds.push(cmd);
    }
}
