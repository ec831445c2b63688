//! Tool configuration
//!
//! Configuration file: ~/.config/user-secrets/config.yaml
//!
//! ```yaml
//! editor: code --wait   # used when neither VISUAL nor EDITOR is set
//! open: true            # false never launches an editor
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use user_secrets_core::Paths;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Fallback editor command
    #[serde(default)]
    pub editor: Option<String>,

    /// Open the store in an editor after resolving it
    #[serde(default = "default_open")]
    pub open: bool,
}

fn default_open() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: None,
            open: default_open(),
        }
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Paths::new().config_file())
    }

    /// Load configuration from a specific path; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }
}
