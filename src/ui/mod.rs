//! Rendering surface boundary: geometry, styles, paint commands and the
//! backends that turn them into terminal output.

pub mod backend;
pub mod core;
