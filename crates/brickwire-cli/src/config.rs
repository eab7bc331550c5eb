//! Brickwire CLI configuration
//!
//! Loaded from an optional TOML file layered over the defaults; any field
//! the file omits keeps its default value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use brickwire_link::LinkConfig;

use crate::error::{CliError, Result};

/// Complete configuration for the CLI application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Link and dispatcher settings
    pub link: LinkConfig,

    /// Peer id announced by the simulated hub
    pub simulated_hub: SimulatedHubConfig,
}

/// Settings for the `simulate` command's loopback hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedHubConfig {
    pub peer_id: String,
    /// Give up waiting for the link after this long (ms)
    pub connect_wait_ms: u64,
}

impl Default for SimulatedHubConfig {
    fn default() -> Self {
        Self {
            peer_id: "00:16:53:00:00:01".to_string(),
            connect_wait_ms: 5000,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the hub cannot represent
    pub fn validate(&self) -> Result<()> {
        if !(-100..=100).contains(&self.link.default_speed) {
            return Err(CliError::Config(format!(
                "default_speed must be within -100..=100, got {}",
                self.link.default_speed
            )));
        }
        if self.link.ramp_ms > u8::MAX as u32 {
            return Err(CliError::Config(format!(
                "ramp_ms must fit in one byte, got {}",
                self.link.ramp_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [link]
            default_speed = 80
            "#,
        )
        .unwrap();

        assert_eq!(config.link.default_speed, 80);
        assert_eq!(config.link.ramp_ms, 50);
        assert_eq!(config.link.scan_filter.major_device_class, 8);
        assert_eq!(config.simulated_hub, SimulatedHubConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_rejects_wide_ramp() {
        let result = AppConfig::from_toml(
            r#"
            [link]
            ramp_ms = 300
            "#,
        );
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(matches!(
            AppConfig::from_toml("link = ["),
            Err(CliError::TomlParsing(_))
        ));
    }
}
