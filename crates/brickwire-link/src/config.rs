//! Hub link configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Scan Filter
// ----------------------------------------------------------------------------

/// Device-class discriminators that restrict discovery to EV3 bricks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFilter {
    /// Bluetooth major device class (8 = toy)
    pub major_device_class: u8,
    /// Bluetooth minor device class (1 = robot)
    pub minor_device_class: u8,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            major_device_class: 8,
            minor_device_class: 1,
        }
    }
}

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the hub link and dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Time the transport needs before the first scan request (ms)
    pub scan_settle_delay_ms: u64,
    /// Motor speed used by turn commands, in percent
    pub default_speed: i32,
    /// Ramp-up and ramp-down length for motor runs (ms)
    pub ramp_ms: u32,
    /// Discovery filter passed to the scan capability
    pub scan_filter: ScanFilter,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            scan_settle_delay_ms: 1000,
            default_speed: 50,
            ramp_ms: 50,
            scan_filter: ScanFilter::default(),
        }
    }
}

impl LinkConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Settling delay as a [`Duration`]
    pub fn scan_settle_delay(&self) -> Duration {
        Duration::from_millis(self.scan_settle_delay_ms)
    }

    /// Set the settling delay before scanning
    pub fn with_scan_settle_delay(mut self, delay: Duration) -> Self {
        self.scan_settle_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the default motor speed
    pub fn with_default_speed(mut self, speed: i32) -> Self {
        self.default_speed = speed;
        self
    }

    /// Set the ramp length
    pub fn with_ramp_ms(mut self, ramp_ms: u32) -> Self {
        self.ramp_ms = ramp_ms;
        self
    }

    /// Set the scan filter
    pub fn with_scan_filter(mut self, filter: ScanFilter) -> Self {
        self.scan_filter = filter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.default_speed, 50);
        assert_eq!(config.ramp_ms, 50);
        assert_eq!(config.scan_settle_delay(), Duration::from_secs(1));
        assert_eq!(config.scan_filter.major_device_class, 8);
        assert_eq!(config.scan_filter.minor_device_class, 1);
    }

    #[test]
    fn test_builder() {
        let config = LinkConfig::new()
            .with_scan_settle_delay(Duration::from_millis(250))
            .with_default_speed(80)
            .with_ramp_ms(20);
        assert_eq!(config.scan_settle_delay_ms, 250);
        assert_eq!(config.default_speed, 80);
        assert_eq!(config.ramp_ms, 20);
    }
}
