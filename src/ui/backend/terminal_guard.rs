//! Terminal mode switching with idempotent restore.
//!
//! `TerminalMode` owns the raw-mode/alternate-screen state of the real
//! terminal. Leaving it is safe from any thread and any number of times,
//! which lets a panic hook and the normal shutdown path race harmlessly.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait TerminalOps: Send + Sync + 'static {
    fn setup(&self) -> io::Result<()>;
    fn restore(&self) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct CrosstermTerminalOps;

impl TerminalOps for CrosstermTerminalOps {
    fn setup(&self) -> io::Result<()> {
        use crossterm::{
            cursor,
            event::EnableMouseCapture,
            execute,
            terminal::{enable_raw_mode, EnterAlternateScreen},
        };

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        Ok(())
    }

    fn restore(&self) -> io::Result<()> {
        use crossterm::{
            cursor,
            event::DisableMouseCapture,
            execute,
            terminal::{disable_raw_mode, LeaveAlternateScreen},
        };

        // Try every step even if one fails.
        let mut first_err: Option<io::Error> = None;
        if let Err(err) = disable_raw_mode() {
            first_err.get_or_insert(err);
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, cursor::Show) {
            first_err.get_or_insert(err);
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Cloneable handle that puts the terminal back into cooked mode once per
/// `TerminalMode::enter`.
#[derive(Clone)]
pub struct TerminalRestorer {
    active: Arc<AtomicBool>,
    ops: Arc<dyn TerminalOps>,
}

impl TerminalRestorer {
    pub fn restore(&self) -> io::Result<()> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.ops.restore()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

pub struct TerminalMode {
    restorer: TerminalRestorer,
}

impl TerminalMode {
    pub fn new() -> io::Result<Self> {
        Self::with_ops(Arc::new(CrosstermTerminalOps))
    }

    pub fn with_ops(ops: Arc<dyn TerminalOps>) -> io::Result<Self> {
        let mode = Self {
            restorer: TerminalRestorer {
                active: Arc::new(AtomicBool::new(false)),
                ops,
            },
        };
        mode.enter()?;
        Ok(mode)
    }

    /// Switches the terminal into UI mode again after `leave`.
    pub fn enter(&self) -> io::Result<()> {
        if self.restorer.active.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Err(err) = self.restorer.ops.setup() {
            let _ = self.restorer.restore();
            return Err(err);
        }
        Ok(())
    }

    pub fn leave(&self) -> io::Result<()> {
        self.restorer.restore()
    }

    pub fn restorer(&self) -> TerminalRestorer {
        self.restorer.clone()
    }
}

impl Drop for TerminalMode {
    fn drop(&mut self) {
        let _ = self.restorer.restore();
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/ui/backend/terminal_guard.rs"]
mod tests;
