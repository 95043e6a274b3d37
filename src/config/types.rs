//! Configuration type definitions.

use knuffel::Decode;
use std::path::{Path, PathBuf};

/// Expand tilde (~) prefix to the user's home directory.
/// Handles both "~" alone and "~/path/to/something" patterns.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Expand a `--config` path. Paths that are not valid UTF-8 are used as-is.
pub fn expand_config_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) => expand_tilde(text),
        None => path.to_path_buf(),
    }
}

/// Main configuration structure parsed from awssm.kdl.
#[derive(Debug, Decode, Clone, Default)]
pub struct Config {
    #[knuffel(child)]
    pub defaults: Option<Defaults>,
}

/// Default settings, overridden by command-line flags.
#[derive(Debug, Decode, Clone, Default)]
pub struct Defaults {
    /// AWS profile from ~/.aws/credentials or ~/.aws/config.
    #[knuffel(property)]
    pub profile: Option<String>,

    #[knuffel(property)]
    pub region: Option<String>,

    /// Alternative Secrets Manager endpoint (e.g. LocalStack).
    #[knuffel(property(name = "endpoint_url"))]
    pub endpoint_url: Option<String>,

    /// Secret used when --secret is not given.
    #[knuffel(property(name = "default_secret"))]
    pub default_secret: Option<String>,

    /// Reject writes when the secret changed since it was read.
    #[knuffel(property(name = "verify_version"))]
    pub verify_version: Option<bool>,
}

impl Config {
    pub fn profile(&self) -> Option<String> {
        self.defaults.as_ref().and_then(|d| d.profile.clone())
    }

    pub fn region(&self) -> Option<String> {
        self.defaults.as_ref().and_then(|d| d.region.clone())
    }

    pub fn endpoint_url(&self) -> Option<String> {
        self.defaults.as_ref().and_then(|d| d.endpoint_url.clone())
    }

    pub fn default_secret(&self) -> Option<String> {
        self.defaults
            .as_ref()
            .and_then(|d| d.default_secret.clone())
            .filter(|s| !s.is_empty())
    }

    /// Defaults to true.
    pub fn verify_version(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.verify_version)
            .unwrap_or(true)
    }
}
