//! Units of work executed by the dispatcher.
//!
//! Any thread may post an `Event`; the dispatcher runs it on the main thread
//! with the global lock held and exclusive access to the `Runtime`.

pub mod queue;

use crate::error::Result;
use crate::runtime::Runtime;

pub use queue::EventQueue;

pub trait Event: Send + 'static {
    /// Consumes the event. An `Err` propagates out of the main loop.
    fn dispatch(self: Box<Self>, rt: &mut Runtime) -> Result<()>;
}

pub type BoxedEvent = Box<dyn Event>;

/// Adapts a closure into an `Event`.
pub struct FnEvent<F>(F);

impl<F> Event for FnEvent<F>
where
    F: FnOnce(&mut Runtime) -> Result<()> + Send + 'static,
{
    fn dispatch(self: Box<Self>, rt: &mut Runtime) -> Result<()> {
        (self.0)(rt)
    }
}

pub fn from_fn<F>(f: F) -> BoxedEvent
where
    F: FnOnce(&mut Runtime) -> Result<()> + Send + 'static,
{
    Box::new(FnEvent(f))
}

slotmap::new_key_type! {
    /// Key of a main-thread closure parked in the runtime.
    pub struct LocalKey;
}

/// Event whose body lives on the main thread.
///
/// Closures that capture widgets are not `Send`, so they are parked in the
/// runtime by `Runtime::local_event` and only their key travels through the
/// queue. Firing a key whose closure is gone does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalEvent {
    pub(crate) key: LocalKey,
}

impl Event for LocalEvent {
    fn dispatch(self: Box<Self>, rt: &mut Runtime) -> Result<()> {
        rt.run_local(self.key)
    }
}
