//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use turing_screen_hw::{Inversion, Orientation, SerialSettings, TimingGate};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Serial port configuration
    #[serde(default)]
    pub serial: SerialConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Serial port configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial device path
    #[serde(default = "default_device")]
    pub device: String,

    /// Baud rate
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Read timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// RTS/CTS flow control
    #[serde(default = "default_true")]
    pub hardware_flow_control: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud: default_baud(),
            timeout_ms: default_timeout(),
            hardware_flow_control: default_true(),
        }
    }
}

impl SerialConfig {
    pub fn settings(&self) -> SerialSettings {
        SerialSettings {
            baud: self.baud,
            timeout: Duration::from_millis(self.timeout_ms),
            hardware_flow_control: self.hardware_flow_control,
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Hardware variant: "auto", "1" or "2"
    #[serde(default = "default_variant")]
    pub variant: String,

    /// Orientation: "portrait" or "landscape"
    #[serde(default = "default_orientation")]
    pub orientation: String,

    /// Content inversion: "none", "x", "y" or "xy"
    #[serde(default = "default_invert")]
    pub invert: String,

    /// Brightness applied on startup (0-255)
    #[serde(default)]
    pub brightness: Option<u8>,

    /// Delay between bitmap data and the next command, in milliseconds
    #[serde(default = "default_inter_bitmap_delay")]
    pub inter_bitmap_delay_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            orientation: default_orientation(),
            invert: default_invert(),
            brightness: None,
            inter_bitmap_delay_ms: default_inter_bitmap_delay(),
        }
    }
}

impl DisplayConfig {
    pub fn orientation(&self) -> Result<Orientation> {
        Ok(self.orientation.parse()?)
    }

    pub fn inversion(&self) -> Result<Inversion> {
        Ok(self.invert.parse()?)
    }

    pub fn gate(&self) -> TimingGate {
        TimingGate::new(Duration::from_millis(self.inter_bitmap_delay_ms))
    }
}

// Default value functions
fn default_device() -> String {
    "/dev/ttyACM0".to_string()
}

fn default_baud() -> u32 {
    115_200
}

fn default_timeout() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_variant() -> String {
    "auto".to_string()
}

fn default_orientation() -> String {
    "portrait".to_string()
}

fn default_invert() -> String {
    "none".to_string()
}

fn default_inter_bitmap_delay() -> u64 {
    20
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }
}
