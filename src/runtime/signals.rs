//! Signal relay thread.
//!
//! Signals are received through `signal_hook`'s self-pipe iterator, outside
//! of any handler, and turned into events: a window resize relayouts the
//! tree, every other awaited signal asks the main loop to exit.

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGWINCH};
use signal_hook::iterator::Signals;

use super::Handle;
use crate::error::Result;
use crate::thread::Thread;

pub const RELAYED: [i32; 5] = [SIGWINCH, SIGTERM, SIGINT, SIGQUIT, SIGHUP];

pub(crate) fn spawn(handle: Handle) -> Result<Thread> {
    let mut signals = Signals::new(RELAYED)?;
    let closer = signals.handle();
    Thread::spawn("signals", move |token| {
        token.on_cancel(move || closer.close());
        for signal in signals.forever() {
            relay(&handle, signal);
        }
        tracing::debug!("signal relay closed");
    })
}

fn relay(handle: &Handle, signal: i32) {
    if signal == SIGWINCH {
        tracing::debug!("window resized");
        handle.post_fn(|rt| rt.handle_resize());
    } else {
        tracing::info!(signal, "termination signal received");
        handle.exit_main();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/signals.rs"]
mod tests;
