//! Optional TOML configuration
//!
//! Every key has a built-in default, so a host without a configuration file
//! gets the stock printer policy.

use crate::error::{GuardError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/printguard/config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Filesystem root every file action is resolved under
    pub root_dir: PathBuf,
    pub command_timeout_secs: u64,
    pub watchdog_interval_secs: u64,
    /// Start the base print service once browsing has been disabled
    pub start_cups_after: bool,
    pub cups_unit: String,
    /// Services stopped, disabled and masked, in order
    pub services: Vec<String>,
    /// Regular expressions matched against process names
    pub process_patterns: Vec<String>,
    /// Package names (apt globs allowed) pinned to priority -1
    pub pinned_packages: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("/"),
            command_timeout_secs: 10,
            watchdog_interval_secs: 15,
            start_cups_after: true,
            cups_unit: "cups.service".to_string(),
            services: vec![
                "cups-browsed.service".to_string(),
                "ipp-usb.service".to_string(),
            ],
            process_patterns: vec![
                "^system-config-printer(-applet)?$".to_string(),
                "^printer-applet$".to_string(),
                "^cups-browsed$".to_string(),
                "^ipp-usb$".to_string(),
            ],
            pinned_packages: vec![
                "cups-browsed".to_string(),
                "ipp-usb".to_string(),
                "system-config-printer*".to_string(),
            ],
        }
    }
}

impl PolicyConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// read when present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(GuardError::ConfigError(format!(
                        "{} does not exist",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    tracing::debug!("no configuration file, using built-in policy");
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.command_timeout_secs == 0 {
            return Err(GuardError::ConfigError(
                "command_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.watchdog_interval_secs == 0 {
            return Err(GuardError::ConfigError(
                "watchdog_interval_secs must be greater than zero".to_string(),
            ));
        }
        if !self.root_dir.is_absolute() {
            return Err(GuardError::ConfigError(format!(
                "root_dir must be absolute: {}",
                self.root_dir.display()
            )));
        }
        if self.cups_unit.trim().is_empty() || self.services.iter().any(|s| s.trim().is_empty()) {
            return Err(GuardError::ConfigError(
                "service unit names cannot be empty".to_string(),
            ));
        }
        for pattern in &self.process_patterns {
            Regex::new(pattern)
                .map_err(|e| GuardError::PatternError(format!("{}: {}", pattern, e)))?;
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_secs(self.watchdog_interval_secs)
    }
}
