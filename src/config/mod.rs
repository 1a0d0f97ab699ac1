//! Keybinding scopes, named styles and the on-disk settings file.

pub mod keybindings;
pub mod settings;
pub mod styles;

pub use keybindings::{parse_key, Keybindings};
pub use settings::Settings;
pub use styles::Styles;
