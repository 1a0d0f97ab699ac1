//! Owned handle around a named OS thread with cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crate::error::{Error, Result};

type CancelHook = Box<dyn FnOnce() + Send>;

struct StopState {
    stopped: AtomicBool,
    hooks: Mutex<Vec<CancelHook>>,
}

impl StopState {
    fn cancel(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let hooks = std::mem::take(
            &mut *self.hooks.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for hook in hooks {
            hook();
        }
    }
}

/// Cancellation flag handed to a thread body.
///
/// A body checks `is_stopped` at each loop turn, and registers an `on_cancel`
/// hook for every blocking wait that must be interrupted. Hooks run on the
/// thread that calls `Thread::cancel`.
#[derive(Clone)]
pub struct StopToken {
    state: Arc<StopState>,
}

impl StopToken {
    fn new() -> Self {
        Self {
            state: Arc::new(StopState {
                stopped: AtomicBool::new(false),
                hooks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::Acquire)
    }

    /// Registers a hook that wakes this thread from a blocking wait. Runs
    /// immediately when cancellation was already requested.
    pub fn on_cancel(&self, hook: impl FnOnce() + Send + 'static) {
        let mut hooks = self
            .state
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.is_stopped() {
            drop(hooks);
            hook();
            return;
        }
        hooks.push(Box::new(hook));
    }
}

/// A running OS thread. Dropping the handle without `join` detaches it.
pub struct Thread {
    name: String,
    handle: Option<JoinHandle<()>>,
    token: StopToken,
}

impl Thread {
    /// Starts `body` on a new thread. Either the thread is running when this
    /// returns `Ok`, or nothing was started.
    pub fn spawn<F>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: FnOnce(StopToken) + Send + 'static,
    {
        let name = name.into();
        let token = StopToken::new();
        let body_token = token.clone();
        let handle = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || body(body_token))
            .map_err(|err| Error::ThreadCreate {
                name: name.clone(),
                code: err.raw_os_error(),
            })?;
        tracing::debug!(thread = %name, "thread started");
        Ok(Self {
            name,
            handle: Some(handle),
            token,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &StopToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Requests cooperative termination and runs the registered wake hooks.
    pub fn cancel(&self) {
        self.token.state.cancel();
    }

    /// Waits for the body to return. A panicking body is reported as
    /// `Error::ThreadJoin`.
    pub fn join(mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        match handle.join() {
            Ok(()) => {
                tracing::debug!(thread = %self.name, "thread joined");
                Ok(())
            }
            Err(_) => Err(Error::ThreadJoin {
                name: std::mem::take(&mut self.name),
            }),
        }
    }

    pub fn cancel_and_join(self) -> Result<()> {
        self.cancel();
        self.join()
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        if self.handle.take().is_some() {
            tracing::trace!(thread = %self.name, "thread detached");
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/thread.rs"]
mod tests;
