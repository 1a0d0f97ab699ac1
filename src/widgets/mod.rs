//! The widget tree.
//!
//! [`core`] defines the base node every widget embeds and the [`Widget`]
//! trait; [`container`] and [`passthrough`] define how widgets own and
//! delegate to children. The rest are concrete widgets.

pub mod bin;
pub mod boxed;
pub mod container;
pub mod core;
pub mod label;
pub mod multiplex;
pub mod passthrough;
pub mod signal;
pub mod stacked;

pub use self::bin::{Bin, BinPolicy, Center, Fill, Frame, SizeBox, Transient};
pub use self::boxed::Boxed;
pub use self::container::Container;
pub use self::core::{KeyConnection, Widget, WidgetCore, WidgetExt, WidgetRef};
pub use self::label::Label;
pub use self::multiplex::Multiplex;
pub use self::passthrough::Passthrough;
pub use self::signal::{Connection, Signal};
pub use self::stacked::Stacked;

#[cfg(test)]
#[path = "../../tests/unit/widgets/support.rs"]
pub(crate) mod test_support;
