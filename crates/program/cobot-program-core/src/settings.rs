//! Application and project settings files (TOML).
//!
//! Application level:
//! ```toml
//! [Window]
//! width = 1280.0
//! height = 720.0
//!
//! [Style]
//! darkMode = "on"
//!
//! [Plugins]
//! loaded = ["SofaPython3"]
//! ```
//!
//! Project level, one table per window identifier:
//! ```toml
//! [windows.Program]
//! open = true
//! geometry = [0.0, 600.0, 1280.0, 200.0]
//! dock = "bottom"
//! ```
//!
//! Loading never fails hard: a missing or malformed file yields the
//! defaults and a log line.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    pub width: f64,
    pub height: f64,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSection {
    #[serde(rename = "darkMode", with = "on_off")]
    pub dark_mode: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsSection {
    pub loaded: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    #[serde(rename = "Window")]
    pub window: WindowSection,
    #[serde(rename = "Style")]
    pub style: StyleSection,
    #[serde(rename = "Plugins")]
    pub plugins: PluginsSection,
}

/// Placement of one dockable window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowState {
    pub open: bool,
    /// `[x, y, width, height]`
    pub geometry: [f64; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dock: Option<String>,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            open: true,
            geometry: [0.0; 4],
            dock: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub windows: BTreeMap<String, WindowState>,
}

impl ProjectSettings {
    pub fn window(&self, id: &str) -> Option<&WindowState> {
        self.windows.get(id)
    }

    pub fn set_window(&mut self, id: impl Into<String>, state: WindowState) {
        self.windows.insert(id.into(), state);
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_toml(path)
    }

    pub fn load_or_default(path: &Path) -> Self {
        load_toml_or_default(path, "project")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_toml(self, path)
    }
}

impl AppSettings {
    pub fn load(path: &Path) -> Result<Self> {
        load_toml(path)
    }

    pub fn load_or_default(path: &Path) -> Self {
        load_toml_or_default(path, "application")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_toml(self, path)
    }
}

fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

fn load_toml_or_default<T: DeserializeOwned + Default>(path: &Path, which: &str) -> T {
    if !path.exists() {
        log::info!("no {which} settings at {}, using defaults", path.display());
        return T::default();
    }
    match load_toml(path) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!(
                "failed to load {which} settings from {} ({err}), using defaults",
                path.display()
            );
            T::default()
        }
    }
}

fn save_toml<T: Serialize>(settings: &T, path: &Path) -> Result<()> {
    let text = toml::to_string_pretty(settings)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, text)?;
    Ok(())
}

/// `"on"` / `"off"` flag. Anything but `"on"` reads as off.
mod on_off {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(if *value { "on" } else { "off" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
        let text = String::deserialize(d)?;
        Ok(text == "on")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_mode_flag_parses() {
        let s: AppSettings = toml::from_str("[Style]\ndarkMode = \"on\"\n").unwrap();
        assert!(s.style.dark_mode);
        assert_eq!(s.window, WindowSection::default());

        let s: AppSettings = toml::from_str("[Style]\ndarkMode = \"dark\"\n").unwrap();
        assert!(!s.style.dark_mode);
    }

    #[test]
    fn app_settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ini");
        let mut s = AppSettings::default();
        s.window.width = 1920.0;
        s.style.dark_mode = true;
        s.plugins.loaded = vec!["SofaPython3".into()];
        s.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("darkMode = \"on\""));
        assert_eq!(AppSettings::load(&path).unwrap(), s);
    }

    #[test]
    fn malformed_or_missing_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[Window\nwidth = ").unwrap();
        assert!(AppSettings::load(&path).is_err());
        assert_eq!(AppSettings::load_or_default(&path), AppSettings::default());
        assert_eq!(
            ProjectSettings::load_or_default(&dir.path().join("missing.toml")),
            ProjectSettings::default()
        );
    }

    #[test]
    fn project_windows_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("project.toml");
        let mut p = ProjectSettings::default();
        p.set_window(
            "Program",
            WindowState {
                open: false,
                geometry: [0.0, 600.0, 1280.0, 200.0],
                dock: Some("bottom".into()),
            },
        );
        p.set_window("Move", WindowState::default());
        p.save(&path).unwrap();

        let back = ProjectSettings::load(&path).unwrap();
        assert_eq!(back, p);
        assert!(!back.window("Program").unwrap().open);
        assert_eq!(back.window("Move").unwrap().dock, None);
    }
}
