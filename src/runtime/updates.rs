//! Coalescing of relayout/redraw/cursor requests.

use crate::sync::Lock;

/// Which passes the next update turn must run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateFlags {
    pub relayout: bool,
    pub redraw: bool,
    pub cursor: bool,
}

impl UpdateFlags {
    pub const RELAYOUT: Self = Self {
        relayout: true,
        redraw: true,
        cursor: true,
    };
    pub const REDRAW: Self = Self {
        relayout: false,
        redraw: true,
        cursor: true,
    };
    pub const CURSOR: Self = Self {
        relayout: false,
        redraw: false,
        cursor: true,
    };

    pub fn union(self, other: Self) -> Self {
        Self {
            relayout: self.relayout || other.relayout,
            redraw: self.redraw || other.redraw,
            cursor: self.cursor || other.cursor,
        }
    }

    pub fn is_empty(self) -> bool {
        !(self.relayout || self.redraw || self.cursor)
    }
}

#[derive(Default)]
struct State {
    flags: UpdateFlags,
    /// An apply event is queued and has not run yet.
    scheduled: bool,
}

/// Flags OR-accumulated by any thread and drained by the dispatcher.
#[derive(Default)]
pub struct PendingUpdates {
    state: Lock<State>,
}

impl PendingUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `flags` in. Returns true when the caller must post the apply
    /// event, which happens once per drain.
    pub fn request(&self, flags: UpdateFlags) -> bool {
        let mut state = self.state.acquire();
        state.flags = state.flags.union(flags);
        !std::mem::replace(&mut state.scheduled, true)
    }

    /// Reads and clears the flags atomically.
    pub fn take(&self) -> UpdateFlags {
        let mut state = self.state.acquire();
        state.scheduled = false;
        std::mem::take(&mut state.flags)
    }

    pub fn peek(&self) -> UpdateFlags {
        self.state.acquire().flags
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/updates.rs"]
mod tests;
