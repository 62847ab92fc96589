//! Configuration file support
//!
//! Loads configuration from TOML file at ~/.config/upkeep/config.toml.
//! Falls back to defaults if the file doesn't exist or can't be parsed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::constants;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Upkeep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Askpass helper passed to sudo via SUDO_ASKPASS
    pub askpass: PathBuf,

    /// AUR helper override; auto-detected (yay, paru) when unset
    pub aur_helper: Option<String>,

    /// Journal retention passed to `journalctl --vacuum-time`
    pub journal_retention: String,

    /// Mirror count passed to `pacman-mirrors --fasttrack`
    pub mirror_fasttrack: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            askpass: PathBuf::from("/usr/bin/ssh-askpass"),
            aur_helper: None,
            journal_retention: "7d".to_string(),
            mirror_fasttrack: 5,
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults on any error
    pub fn load() -> Self {
        let path = constants::config_dir().join(CONFIG_FILE);
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Read(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.askpass, PathBuf::from("/usr/bin/ssh-askpass"));
        assert!(config.aur_helper.is_none());
        assert_eq!(config.journal_retention, "7d");
        assert_eq!(config.mirror_fasttrack, 5);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("journal_retention = \"14d\"").unwrap();
        assert_eq!(config.journal_retention, "14d");
        assert_eq!(config.mirror_fasttrack, 5);
    }

    #[test]
    fn test_full_config() {
        let config: Config = toml::from_str(
            r#"
            askpass = "/usr/lib/seahorse/ssh-askpass"
            aur_helper = "paru"
            journal_retention = "30d"
            mirror_fasttrack = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.aur_helper.as_deref(), Some("paru"));
        assert_eq!(config.mirror_fasttrack, 10);
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(toml::from_str::<Config>("mirror_fasttrack = \"lots\"").is_err());
    }

    #[test]
    fn test_missing_file_is_a_not_found_read_error() {
        let err = Config::load_from(std::path::Path::new(
            "/nonexistent/upkeep-test/config.toml",
        ))
        .unwrap_err();
        match err {
            ConfigError::Read(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected read error, got {}", other),
        }
    }
}
