use rustc_hash::FxHashMap;

use crate::ui::core::style::{Color, Mod, Style};

/// Named style table. Widgets look styles up by role name; a name with no
/// entry resolves to the empty style, which leaves the surrounding style as is.
#[derive(Debug, Clone, Default)]
pub struct Styles {
    styles: FxHashMap<String, Style>,
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut styles = Self::new();
        let plain = Style::default();
        styles.set("Default", plain.fg(Color::Indexed(15)).bg(Color::Indexed(0)));
        styles.set("Error", plain.fg(Color::Indexed(1)).add_mod(Mod::BOLD));
        styles.set("Header", plain.fg(Color::Indexed(15)).bg(Color::Indexed(4)).add_mod(Mod::BOLD));
        styles.set("Status", plain.fg(Color::Indexed(15)).bg(Color::Indexed(4)));
        styles.set("MultiplexTab", plain.fg(Color::Indexed(15)).bg(Color::Indexed(4)));
        styles.set(
            "MultiplexTabHighlighted",
            plain.fg(Color::Indexed(4)).bg(Color::Indexed(15)),
        );
        styles.set("Frame", plain);
        styles.set("Label", plain);
        styles
    }

    pub fn set(&mut self, name: &str, style: Style) {
        self.styles.insert(name.to_string(), style);
    }

    pub fn get(&self, name: &str) -> Style {
        self.styles.get(name).copied().unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/styles.rs"]
mod tests;
