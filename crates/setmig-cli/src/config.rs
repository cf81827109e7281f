//! Tool configuration
//!
//! Optional TOML file overriding tool paths, device targeting, provider
//! authorities, and the boot-wait bound. Everything has a sensible default so
//! the tool runs without a config file at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Explicit adb binary path; `PATH` lookup when unset.
    pub adb_path: Option<String>,

    /// Explicit fastboot binary path; `PATH` lookup when unset.
    pub fastboot_path: Option<String>,

    /// Device serial to target; first connected device when unset.
    pub serial: Option<String>,

    /// Authority the legacy snapshot is seeded into.
    pub legacy_authority: String,

    /// Authority queried after the update completes.
    pub migrated_authority: String,

    /// Bound on the post-reboot boot-complete wait, in seconds.
    pub boot_timeout_secs: u64,

    /// Poll interval during the boot-complete wait, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            adb_path: None,
            fastboot_path: None,
            serial: None,
            legacy_authority: "settings".to_string(),
            migrated_authority: "migratedsettings".to_string(),
            boot_timeout_secs: 300,
            poll_interval_secs: 2,
        }
    }
}

impl ToolConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn boot_timeout(&self) -> Duration {
        Duration::from_secs(self.boot_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
