//! Real terminal surface: crossterm for modes and input, ratatui for the
//! double-buffered cell diffing.

use std::io;
use std::time::Duration;

use ratatui::backend::{Backend as _, CrosstermBackend};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as RRect;
use ratatui::style::{Color as RColor, Modifier as RModifier, Style as RStyle};
use ratatui::Terminal;

use super::terminal_guard::{TerminalMode, TerminalRestorer};
use super::{rasterize, Backend, CellSink};
use crate::ui::core::geom::{Pos, Rect, Size};
use crate::ui::core::input::{
    InputEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use crate::ui::core::painter::PaintCmd;
use crate::ui::core::style::{Color, Mod, Style};

pub struct TerminalBackend {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    mode: TerminalMode,
    size: Size,
    cursor: Option<Pos>,
    dirty: bool,
}

impl TerminalBackend {
    /// Enters raw mode and the alternate screen.
    pub fn new() -> io::Result<Self> {
        let mode = TerminalMode::new()?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let (w, h) = crossterm::terminal::size()?;
        let mut backend = Self {
            terminal,
            mode,
            size: Size::new(w, h),
            cursor: None,
            dirty: false,
        };
        backend.terminal.resize(RRect::new(0, 0, w, h))?;
        backend.terminal.clear()?;
        Ok(backend)
    }

    /// Handle for restoring the terminal from a panic hook.
    pub fn restorer(&self) -> TerminalRestorer {
        self.mode.restorer()
    }
}

impl Backend for TerminalBackend {
    fn size(&self) -> Size {
        self.size
    }

    fn refresh_size(&mut self) -> io::Result<Size> {
        let (w, h) = crossterm::terminal::size()?;
        if Size::new(w, h) != self.size {
            self.size = Size::new(w, h);
            self.terminal.resize(RRect::new(0, 0, w, h))?;
        }
        Ok(self.size)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.terminal.clear()
    }

    fn draw(&mut self, cmds: &[PaintCmd]) {
        rasterize(&mut RatatuiCells(self.terminal.current_buffer_mut()), cmds);
        self.dirty = true;
    }

    fn set_cursor(&mut self, pos: Option<Pos>) {
        self.cursor = pos;
    }

    fn flush(&mut self) -> io::Result<()> {
        if std::mem::take(&mut self.dirty) {
            self.terminal.flush()?;
            self.terminal.swap_buffers();
        }
        match self.cursor {
            Some(pos) => {
                self.terminal.set_cursor_position((pos.x, pos.y))?;
                self.terminal.show_cursor()?;
            }
            None => self.terminal.hide_cursor()?,
        }
        self.terminal.backend_mut().flush()
    }

    fn read_input(&mut self) -> io::Result<Option<InputEvent>> {
        while crossterm::event::poll(Duration::ZERO)? {
            if let Some(event) = into_input_event(crossterm::event::read()?) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.mode.leave()
    }

    fn resume(&mut self) -> io::Result<()> {
        self.mode.enter()?;
        self.terminal.clear()
    }
}

struct RatatuiCells<'a>(&'a mut Buffer);

impl CellSink for RatatuiCells<'_> {
    fn area(&self) -> Rect {
        let area = self.0.area;
        Rect::new(area.x, area.y, area.width, area.height)
    }

    fn put(&mut self, x: u16, y: u16, symbol: &str, style: Style) {
        if let Some(cell) = self.0.cell_mut((x, y)) {
            cell.reset();
            cell.set_symbol(symbol).set_style(to_ratatui_style(style));
        }
    }

    fn restyle(&mut self, x: u16, y: u16, style: Style) {
        if let Some(cell) = self.0.cell_mut((x, y)) {
            cell.set_style(to_ratatui_style(style));
        }
    }
}

fn to_ratatui_style(s: Style) -> RStyle {
    let mut out = RStyle::default();
    if let Some(fg) = s.fg {
        out = out.fg(to_ratatui_color(fg));
    }
    if let Some(bg) = s.bg {
        out = out.bg(to_ratatui_color(bg));
    }
    out.add_modifier(to_ratatui_mods(s.mods))
}

fn to_ratatui_color(c: Color) -> RColor {
    match c {
        Color::Reset => RColor::Reset,
        Color::Rgb(r, g, b) => RColor::Rgb(r, g, b),
        Color::Indexed(i) => RColor::Indexed(i),
    }
}

fn to_ratatui_mods(m: Mod) -> RModifier {
    [
        (Mod::BOLD, RModifier::BOLD),
        (Mod::DIM, RModifier::DIM),
        (Mod::ITALIC, RModifier::ITALIC),
        (Mod::UNDERLINE, RModifier::UNDERLINED),
        (Mod::REVERSE, RModifier::REVERSED),
        (Mod::BLINK, RModifier::SLOW_BLINK),
    ]
    .into_iter()
    .filter(|(ours, _)| m.contains(*ours))
    .fold(RModifier::empty(), |acc, (_, theirs)| acc | theirs)
}

/// Converts a crossterm event; events the widget tree has no use for map to `None`.
pub fn into_input_event(event: crossterm::event::Event) -> Option<InputEvent> {
    Some(match event {
        crossterm::event::Event::Key(key) => InputEvent::Key(into_key_event(key)),
        crossterm::event::Event::Mouse(mouse) => InputEvent::Mouse(into_mouse_event(mouse)),
        crossterm::event::Event::Resize(w, h) => InputEvent::Resize(w, h),
        crossterm::event::Event::FocusGained => InputEvent::FocusGained,
        crossterm::event::Event::FocusLost => InputEvent::FocusLost,
        crossterm::event::Event::Paste(s) => InputEvent::Paste(s),
    })
}

fn into_key_event(event: crossterm::event::KeyEvent) -> KeyEvent {
    let mut modifiers = into_key_modifiers(event.modifiers);
    let code = into_key_code(event.code, &mut modifiers);
    KeyEvent {
        code,
        modifiers,
        kind: match event.kind {
            crossterm::event::KeyEventKind::Press => KeyEventKind::Press,
            crossterm::event::KeyEventKind::Repeat => KeyEventKind::Repeat,
            crossterm::event::KeyEventKind::Release => KeyEventKind::Release,
        },
    }
}

fn into_key_modifiers(mods: crossterm::event::KeyModifiers) -> KeyModifiers {
    use crossterm::event::KeyModifiers as CtMods;

    [
        (CtMods::SHIFT, KeyModifiers::SHIFT),
        (CtMods::CONTROL, KeyModifiers::CONTROL),
        (CtMods::ALT, KeyModifiers::ALT),
        (CtMods::SUPER, KeyModifiers::SUPER),
    ]
    .into_iter()
    .filter(|(theirs, _)| mods.contains(*theirs))
    .fold(KeyModifiers::NONE, |acc, (_, ours)| acc | ours)
}

fn into_key_code(code: crossterm::event::KeyCode, modifiers: &mut KeyModifiers) -> KeyCode {
    use crossterm::event::KeyCode as CtKey;

    match code {
        CtKey::Char(ch) => KeyCode::Char(ch),
        CtKey::Enter => KeyCode::Enter,
        CtKey::Tab => KeyCode::Tab,
        CtKey::BackTab => KeyCode::BackTab,
        CtKey::Esc => KeyCode::Esc,
        CtKey::Backspace => KeyCode::Backspace,
        CtKey::Delete => KeyCode::Delete,
        CtKey::Insert => KeyCode::Insert,
        CtKey::Up => KeyCode::Up,
        CtKey::Down => KeyCode::Down,
        CtKey::Left => KeyCode::Left,
        CtKey::Right => KeyCode::Right,
        CtKey::Home => KeyCode::Home,
        CtKey::End => KeyCode::End,
        CtKey::PageUp => KeyCode::PageUp,
        CtKey::PageDown => KeyCode::PageDown,
        CtKey::F(n) => KeyCode::F(n),
        // Ctrl+Space arrives as NUL.
        CtKey::Null => {
            *modifiers |= KeyModifiers::CONTROL;
            KeyCode::Char(' ')
        }
        _ => KeyCode::Unknown,
    }
}

fn into_mouse_event(event: crossterm::event::MouseEvent) -> MouseEvent {
    use crossterm::event::MouseEventKind as CtKind;

    let button = |b: crossterm::event::MouseButton| match b {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    };
    let kind = match event.kind {
        CtKind::Down(b) => MouseEventKind::Down(button(b)),
        CtKind::Up(b) => MouseEventKind::Up(button(b)),
        CtKind::Drag(b) => MouseEventKind::Drag(button(b)),
        CtKind::Moved => MouseEventKind::Moved,
        CtKind::ScrollUp => MouseEventKind::ScrollUp,
        CtKind::ScrollDown => MouseEventKind::ScrollDown,
        CtKind::ScrollLeft => MouseEventKind::ScrollLeft,
        CtKind::ScrollRight => MouseEventKind::ScrollRight,
    };
    MouseEvent {
        kind,
        column: event.column,
        row: event.row,
        modifiers: into_key_modifiers(event.modifiers),
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/ui/backend/terminal.rs"]
mod tests;
