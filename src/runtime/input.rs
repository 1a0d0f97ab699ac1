//! Input readiness thread.
//!
//! The thread only detects that the input source is readable. Reading happens
//! on the main thread inside a `ReadInput` event, because dispatching keys
//! paints; the thread then sleeps on a one-slot cell until the main thread
//! reports how the read went, so it never floods the queue.

use std::io;
use std::os::fd::RawFd;
use std::sync::Arc;

use super::wakeup::{wakeup_pipe, WakeupReader};
use super::{Handle, Runtime};
use crate::error::{Error, Result};
use crate::event::{from_fn, Event};
use crate::sync::Rendezvous;
use crate::thread::Thread;

/// Result of one main-thread read cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// At least one event was read, or the read was interrupted.
    Consumed,
    /// Nothing could be read although the source was readable. `errno` is
    /// set when the read itself failed.
    Eof { errno: Option<i32> },
    /// The thread is being stopped.
    Cancelled,
}

/// Blocking, cancellable wait for input.
pub trait Readiness: Send + 'static {
    /// Blocks until input is readable (`Ok(true)`) or `wakeup` fires
    /// (`Ok(false)`). Pending wakeups are drained before returning.
    fn wait(&mut self, wakeup: &WakeupReader) -> io::Result<bool>;
}

/// Polls a file descriptor together with the wakeup pipe.
pub struct FdReadiness {
    fd: RawFd,
}

impl FdReadiness {
    pub fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    pub fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }
}

impl Readiness for FdReadiness {
    fn wait(&mut self, wakeup: &WakeupReader) -> io::Result<bool> {
        loop {
            let mut fds = [
                libc::pollfd {
                    fd: self.fd,
                    events: libc::POLLIN,
                    revents: 0,
                },
                libc::pollfd {
                    fd: wakeup.raw_fd(),
                    events: libc::POLLIN,
                    revents: 0,
                },
            ];
            // SAFETY: `fds` is a valid array of two pollfd entries.
            let ret = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
            if ret < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if fds[1].revents != 0 {
                wakeup.drain();
                return Ok(false);
            }
            let revents = fds[0].revents;
            if revents & libc::POLLNVAL != 0 {
                return Err(io::Error::from_raw_os_error(libc::EBADF));
            }
            if revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0 {
                return Ok(true);
            }
        }
    }
}

/// Posted by the input thread; reads everything available on the main thread.
pub(crate) struct ReadInput {
    reply: Arc<Rendezvous<ReadOutcome>>,
    /// Suspend count when the readiness was observed.
    generation: u64,
}

impl Event for ReadInput {
    fn dispatch(self: Box<Self>, rt: &mut Runtime) -> Result<()> {
        if self.generation != rt.suspend_count() {
            tracing::warn!(
                generation = self.generation,
                current = rt.suspend_count(),
                "discarding input event from before a suspend"
            );
            let _ = self.reply.try_put(ReadOutcome::Consumed);
            return Ok(());
        }
        let result = rt.read_input();
        let outcome = match &result {
            Ok(outcome) => *outcome,
            Err(_) => ReadOutcome::Consumed,
        };
        // The thread may already be gone; never block the dispatcher on it.
        let _ = self.reply.try_put(outcome);
        result.map(|_| ())
    }
}

/// The running input thread and the means to stop it.
pub(crate) struct InputThread {
    thread: Thread,
}

impl InputThread {
    pub(crate) fn spawn(handle: Handle, readiness: Box<dyn Readiness>) -> Result<Self> {
        let (waker, reader) = wakeup_pipe()?;
        let thread = Thread::spawn("input", move |token| {
            let reply = Arc::new(Rendezvous::new());
            let cancel_reply = Arc::clone(&reply);
            token.on_cancel(move || {
                let _ = cancel_reply.try_put(ReadOutcome::Cancelled);
                waker.wake();
            });
            run(&handle, readiness, &reader, &reply, || token.is_stopped());
        })?;
        Ok(Self { thread })
    }

    pub(crate) fn stop(self) -> Result<()> {
        self.thread.cancel_and_join()
    }
}

fn run(
    handle: &Handle,
    mut readiness: Box<dyn Readiness>,
    wakeup: &WakeupReader,
    reply: &Arc<Rendezvous<ReadOutcome>>,
    stopped: impl Fn() -> bool,
) {
    loop {
        if stopped() {
            return;
        }
        match readiness.wait(wakeup) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                tracing::error!(error = %err, "waiting for input failed");
                handle.post_event(from_fn(move |_| Err(Error::InputUnreadable(err))));
                return;
            }
        }
        if stopped() {
            return;
        }
        handle.post_event(Box::new(ReadInput {
            reply: Arc::clone(reply),
            generation: handle.suspend_count(),
        }));
        match reply.take() {
            ReadOutcome::Consumed => {}
            ReadOutcome::Cancelled => return,
            ReadOutcome::Eof { errno } => {
                tracing::error!(?errno, "input reached end of file");
                handle.post_event(from_fn(move |_| Err(Error::InputEof { errno })));
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/input.rs"]
mod tests;
