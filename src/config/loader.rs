//! Configuration file discovery and loading.

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::error::{AwssmError, Result};

const CONFIG_FILE: &str = "awssm.kdl";

impl Config {
    /// Get the explicit ~/.config/awssm/awssm.kdl path (XDG-style, cross-platform)
    fn xdg_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config/awssm").join(CONFIG_FILE))
    }

    /// Config file search paths in priority order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];

        if let Some(xdg_path) = Self::xdg_config_path() {
            paths.push(xdg_path);
        }

        // Platform-native config directory; identical to the XDG path on Linux.
        if let Some(config_dir) = dirs::config_dir() {
            let native_path = config_dir.join("awssm").join(CONFIG_FILE);
            if Self::xdg_config_path().as_ref() != Some(&native_path) {
                paths.push(native_path);
            }
        }

        paths
    }

    /// Parse KDL config text. `name` is only used in error messages.
    pub fn parse(name: &str, content: &str) -> Result<Self> {
        Ok(knuffel::parse::<Config>(name, content)?)
    }

    /// Load configuration from a specific path. The file must exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AwssmError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&path.display().to_string(), &content)
    }

    /// Load the first config file found on the search path, or an empty
    /// config if there is none.
    pub fn load() -> Result<Self> {
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Config::default()),
        }
    }
}
