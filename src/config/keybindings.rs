use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ui::core::input::{Key, KeyCode, KeyModifiers};

/// One scope of action → keys bindings.
///
/// Scopes chain to a parent: an action with no entry in this scope is looked
/// up in the parent, while an entry here replaces the parent's keys for that
/// action entirely. Scopes live on the main thread and are shared with `Rc`.
#[derive(Debug, Default)]
pub struct Keybindings {
    keymap: RefCell<FxHashMap<String, Vec<Key>>>,
    parent: Option<Rc<Keybindings>>,
}

impl Keybindings {
    pub fn new(parent: Option<Rc<Keybindings>>) -> Self {
        Self {
            keymap: RefCell::new(FxHashMap::default()),
            parent,
        }
    }

    /// The global scope with the toolkit's default bindings.
    pub fn with_defaults() -> Self {
        let bindings = Self::new(None);
        for (action, keys) in DEFAULT_BINDINGS {
            bindings.set(action, keys.iter().filter_map(|k| parse_key(k)).collect());
        }
        bindings
    }

    pub fn parent(&self) -> Option<&Rc<Keybindings>> {
        self.parent.as_ref()
    }

    pub fn set(&self, action: &str, keys: Vec<Key>) {
        self.keymap.borrow_mut().insert(action.to_string(), keys);
    }

    /// Keys bound to `action`, resolved through the parent chain.
    pub fn get(&self, action: &str) -> Vec<Key> {
        if let Some(keys) = self.keymap.borrow().get(action) {
            return keys.clone();
        }
        self.parent
            .as_ref()
            .map(|p| p.get(action))
            .unwrap_or_default()
    }

    pub fn key_matches(&self, key: &Key, action: &str) -> bool {
        if let Some(keys) = self.keymap.borrow().get(action) {
            return keys.contains(key);
        }
        self.parent
            .as_ref()
            .is_some_and(|p| p.key_matches(key, action))
    }

    /// Human-readable name of the first key bound to `action`.
    pub fn describe(&self, action: &str) -> Option<String> {
        self.get(action).first().map(Key::to_string)
    }
}

const DEFAULT_BINDINGS: &[(&str, &[&str])] = &[
    ("Quit", &["q"]),
    ("Cycle", &["tab"]),
    ("Refresh", &["ctrl+l"]),
    ("Up", &["up", "k"]),
    ("Down", &["down", "j"]),
    ("LevelDown", &["J"]),
    ("LevelUp", &["K"]),
    ("Left", &["left", "h"]),
    ("Right", &["right", "l"]),
    ("HistoryNext", &["down", "ctrl+n"]),
    ("HistoryPrev", &["up", "ctrl+p"]),
    ("Parent", &["^"]),
    ("PrevPage", &["pageup", "ctrl+b"]),
    ("NextPage", &["pagedown", "ctrl+f"]),
    ("Begin", &["home", "ctrl+a"]),
    ("End", &["end", "ctrl+e"]),
    ("Search", &["/"]),
    ("SearchBack", &["\\"]),
    ("ReSearch", &["n"]),
    ("RepeatSearchBack", &["N"]),
    ("DelBack", &["backspace", "ctrl+h"]),
    ("DelForward", &["delete", "ctrl+d"]),
    ("DelEOL", &["ctrl+k"]),
    ("DelBOL", &["ctrl+u"]),
    ("Confirm", &["enter"]),
    ("Cancel", &["ctrl+g", "esc", "ctrl+["]),
    ("Undo", &["ctrl+u", "ctrl+_"]),
    ("Help", &["?", "ctrl+h", "f1"]),
    ("ToggleMenuActive", &["ctrl+t", "f10", "ctrl+space"]),
    ("PushButton", &["space"]),
    ("Yes", &["y"]),
    ("No", &["n"]),
    ("ToggleExpanded", &["enter"]),
    ("ExpandAll", &["["]),
    ("CollapseAll", &["]"]),
    ("SelectParent", &["^"]),
];

/// Parses chords such as `ctrl+shift+x`, `f5`, `pagedown` or `Q`.
pub fn parse_key(value: &str) -> Option<Key> {
    let value = value.trim();
    // A lone "+" is the plus key rather than an empty chord.
    if value == "+" {
        return Some(Key::char('+'));
    }
    let mut modifiers = KeyModifiers::NONE;
    let mut key_part: Option<&str> = None;
    for part in value.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" | "meta" => modifiers |= KeyModifiers::ALT,
            "super" | "cmd" => modifiers |= KeyModifiers::SUPER,
            _ if key_part.is_none() => key_part = Some(part),
            _ => return None,
        }
    }
    let code = parse_key_code(key_part?)?;
    Some(Key::new(code, modifiers))
}

fn parse_key_code(value: &str) -> Option<KeyCode> {
    let lower = value.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "prior" => KeyCode::PageUp,
        "pagedown" | "next" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        _ if lower.len() > 1 && lower.starts_with('f') => {
            KeyCode::F(lower[1..].parse::<u8>().ok().filter(|n| (1..=24).contains(n))?)
        }
        _ => {
            let mut chars = value.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(ch)
        }
    };
    Some(code)
}

#[cfg(test)]
#[path = "../../tests/unit/config/keybindings.rs"]
mod tests;
