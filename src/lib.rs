//! cellkit - character-cell terminal UI toolkit
//!
//! Module layout:
//! - sync, thread: blocking primitives and the thread wrapper
//! - event: units of work and the FIFO queue feeding the dispatcher
//! - runtime: dispatcher, update coalescing and the background services
//! - widgets: the widget tree, containers and focus delegation
//! - ui: geometry, styles, painting and rendering backends
//! - config: keybindings, named styles and the settings file

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod runtime;
pub mod sync;
pub mod thread;
pub mod ui;
pub mod widgets;

pub use error::{Error, Result};
pub use runtime::{Handle, Runtime, RuntimeOptions};
