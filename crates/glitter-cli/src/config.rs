//! Persisted CLI configuration: currently just the user's color
//! preference, saved under the OS config directory. Modeled on the
//! sibling `faxt` CLI's own `Config::load`/`save_to_path` shape.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self { color: default_color() }
    }
}

impl Config {
    /// Loads from the standard per-user config location, falling back to
    /// defaults if no file is present or it fails to parse.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => {
                Self::load_from_path(&path).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to_path(&path),
            None => Ok(()),
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("glitter").join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_color_enabled() {
        assert!(Config::default().color);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let original = Config { color: false };
        original.save_to_path(&path).unwrap();
        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn load_from_missing_path_is_an_error() {
        assert!(Config::load_from_path(Path::new("/nonexistent/glitter/config.toml")).is_err());
    }
}
