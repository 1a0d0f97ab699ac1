use std::ops::{BitOr, BitOrAssign};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Reset,
    Rgb(u8, u8, u8),
    Indexed(u8),
}

impl Color {
    /// Parses `#rrggbb` or one of the sixteen terminal colour names.
    pub fn parse(value: &str) -> Option<Color> {
        let v = value.trim();
        if let Some(hex) = v.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        let index = match v.to_ascii_lowercase().as_str() {
            "reset" | "default" => return Some(Color::Reset),
            "black" => 0,
            "red" => 1,
            "green" => 2,
            "yellow" => 3,
            "blue" => 4,
            "magenta" => 5,
            "cyan" => 6,
            "gray" | "grey" => 7,
            "dark_gray" | "darkgrey" => 8,
            "light_red" => 9,
            "light_green" => 10,
            "light_yellow" => 11,
            "light_blue" => 12,
            "light_magenta" => 13,
            "light_cyan" => 14,
            "white" => 15,
            _ => return None,
        };
        Some(Color::Indexed(index))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Mod(u16);

impl Mod {
    pub const NONE: Self = Self(0);
    pub const BOLD: Self = Self(1 << 0);
    pub const DIM: Self = Self(1 << 1);
    pub const UNDERLINE: Self = Self(1 << 2);
    pub const REVERSE: Self = Self(1 << 3);
    pub const ITALIC: Self = Self(1 << 4);
    pub const BLINK: Self = Self(1 << 5);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn parse(name: &str) -> Option<Mod> {
        match name.trim().to_ascii_lowercase().as_str() {
            "bold" => Some(Mod::BOLD),
            "dim" => Some(Mod::DIM),
            "underline" => Some(Mod::UNDERLINE),
            "reverse" => Some(Mod::REVERSE),
            "italic" => Some(Mod::ITALIC),
            "blink" => Some(Mod::BLINK),
            _ => None,
        }
    }
}

impl BitOr for Mod {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mod {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Partial cell attributes. Unset fields inherit from whatever style this
/// one is patched onto.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub mods: Mod,
}

impl Style {
    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn add_mod(mut self, m: Mod) -> Self {
        self.mods |= m;
        self
    }

    /// Layers `other` over `self`: set colours win, modifiers accumulate.
    pub fn patch(mut self, other: Style) -> Self {
        if let Some(fg) = other.fg {
            self.fg = Some(fg);
        }
        if let Some(bg) = other.bg {
            self.bg = Some(bg);
        }
        self.mods |= other.mods;
        self
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/ui/core/style.rs"]
mod tests;
