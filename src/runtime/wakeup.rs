//! Self-pipe that interrupts the input thread's readiness wait.
//!
//! The write end is handed to the cancellation hook; the read end is polled
//! next to the input descriptor. Both ends are non-blocking, so waking never
//! stalls the cancelling thread even when the pipe is full.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::Arc;

/// Write end. Clones share one descriptor, closed with the last clone.
#[derive(Clone)]
pub struct Waker {
    fd: Arc<OwnedFd>,
}

/// Read end, polled by the input thread.
pub struct WakeupReader {
    fd: OwnedFd,
}

pub fn wakeup_pipe() -> io::Result<(Waker, WakeupReader)> {
    let mut fds = [0 as RawFd; 2];
    // SAFETY: `fds` has room for the two descriptors pipe() writes.
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: both descriptors were just created and are owned by nobody else.
    let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    set_nonblocking(&read)?;
    set_nonblocking(&write)?;
    Ok((
        Waker {
            fd: Arc::new(write),
        },
        WakeupReader { fd: read },
    ))
}

fn set_nonblocking(fd: &OwnedFd) -> io::Result<()> {
    let raw = fd.as_raw_fd();
    // SAFETY: `raw` stays open for the duration of both calls.
    unsafe {
        let flags = libc::fcntl(raw, libc::F_GETFL);
        if flags == -1 || libc::fcntl(raw, libc::F_SETFL, flags | libc::O_NONBLOCK) == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

impl Waker {
    /// Makes the read end readable. A full pipe already is, so EAGAIN is
    /// ignored.
    pub fn wake(&self) {
        // SAFETY: the descriptor is open while `self` lives; the buffer is one byte.
        let n = unsafe { libc::write(self.fd.as_raw_fd(), [1u8].as_ptr().cast(), 1) };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::WouldBlock {
                tracing::debug!(error = %err, "wakeup write failed");
            }
        }
    }
}

impl WakeupReader {
    pub fn raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    /// Consumes every pending wakeup; returns how many bytes were read.
    pub fn drain(&self) -> usize {
        let mut buf = [0u8; 64];
        let mut total = 0;
        loop {
            // SAFETY: non-blocking read into a local buffer of the stated length.
            let n = unsafe { libc::read(self.fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) };
            if n <= 0 {
                return total;
            }
            total += n as usize;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/wakeup.rs"]
mod tests;
