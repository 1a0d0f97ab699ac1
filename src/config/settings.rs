//! JSON settings file: keybinding overrides, style overrides and the log filter.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::keybindings::{parse_key, Keybindings};
use super::styles::Styles;
use crate::error::{Error, Result};
use crate::ui::core::input::Key;
use crate::ui::core::style::{Color, Mod, Style};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keybindings: Vec<KeybindingRule>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, StyleOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeybindingRule {
    pub key: String,
    pub action: String,
    /// Keybinding scope name; absent means the global scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mods: Vec<String>,
}

impl StyleOverride {
    fn to_style(&self) -> std::result::Result<Style, String> {
        let mut style = Style::default();
        if let Some(fg) = &self.fg {
            style = style.fg(Color::parse(fg).ok_or_else(|| format!("unknown color {fg:?}"))?);
        }
        if let Some(bg) = &self.bg {
            style = style.bg(Color::parse(bg).ok_or_else(|| format!("unknown color {bg:?}"))?);
        }
        for name in &self.mods {
            style = style.add_mod(Mod::parse(name).ok_or_else(|| format!("unknown modifier {name:?}"))?);
        }
        Ok(style)
    }
}

impl Settings {
    /// Applies the overrides. `scope` resolves a scope name to its bindings;
    /// rules naming an unknown scope, key or style attribute are skipped.
    ///
    /// All keys listed for the same action in the same scope replace that
    /// action's bindings together.
    pub fn apply(
        &self,
        mut scope: impl FnMut(&str) -> Option<Rc<Keybindings>>,
        styles: &mut Styles,
    ) {
        let mut grouped: Vec<((String, String), Vec<Key>)> = Vec::new();
        for rule in &self.keybindings {
            let Some(key) = parse_key(&rule.key) else {
                tracing::warn!(key = %rule.key, action = %rule.action, "ignoring unparseable key");
                continue;
            };
            let scope_name = rule.scope.clone().unwrap_or_else(|| "global".to_string());
            let id = (scope_name, rule.action.clone());
            match grouped.iter_mut().find(|(k, _)| *k == id) {
                Some((_, keys)) => keys.push(key),
                None => grouped.push((id, vec![key])),
            }
        }
        for ((scope_name, action), keys) in grouped {
            match scope(&scope_name) {
                Some(bindings) => bindings.set(&action, keys),
                None => tracing::warn!(scope = %scope_name, %action, "ignoring binding for unknown scope"),
            }
        }

        for (name, entry) in &self.styles {
            match entry.to_style() {
                Ok(style) => styles.set(name, style),
                Err(reason) => tracing::warn!(style = %name, %reason, "ignoring style override"),
            }
        }
    }
}

/// `<cache dir>/<app>/settings.json`.
pub fn settings_path(app: &str) -> Option<PathBuf> {
    get_cache_dir().map(|dir| dir.join(app).join(SETTINGS_FILE))
}

/// `Ok(None)` when the file does not exist.
pub fn load_settings(path: &Path) -> Result<Option<Settings>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(Error::Io(err)),
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|err| Error::Settings(format!("{}: {}", path.display(), err)))
}

/// Writes the default settings to `path` unless a file is already there.
pub fn ensure_settings_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&Settings::default())
            .map_err(|err| Error::Settings(err.to_string()))?;
        std::fs::write(path, content)?;
    }
    Ok(())
}

pub(crate) fn get_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Caches"));
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".cache"));
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            return Some(PathBuf::from(local));
        }
        return std::env::var("APPDATA").ok().map(PathBuf::from);
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
