//! Configuration schema definitions.
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! changes.

use super::error::{ConfigError, ConfigResult};
use crate::port::{BaudRate, PortNaming};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial line configuration
    pub serial: SerialConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.serial.naming().is_valid() {
            return Err(ConfigError::validation(
                "serial.port_naming",
                format!("'{}' has no {{n}} placeholder", self.serial.port_naming),
            ));
        }
        if self.serial.scan_count == 0 {
            return Err(ConfigError::validation(
                "serial.scan_count",
                "at least one port must be scanned",
            ));
        }
        if self.serial.poll_interval_ms == 0 {
            return Err(ConfigError::validation(
                "serial.poll_interval_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Serial line configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path template; `{n}` is replaced by the line number
    pub port_naming: String,
    /// Baud rate applied on open
    pub default_baud: BaudRate,
    /// Bytes per bulk transfer when no length is given; 0 scans to the delimiter
    pub default_read_chunk: usize,
    /// First line number tried when connecting
    pub scan_first: u16,
    /// How many consecutive line numbers are tried
    pub scan_count: u16,
    /// Delay between polls in milliseconds
    pub poll_interval_ms: u64,
    /// Line delimiter byte
    pub delimiter: u8,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_naming: PortNaming::default().template().to_string(),
            default_baud: BaudRate::B9600,
            default_read_chunk: 0,
            scan_first: 1,
            scan_count: 5,
            poll_interval_ms: 33,
            delimiter: b'\n',
        }
    }
}

impl SerialConfig {
    pub fn naming(&self) -> PortNaming {
        PortNaming::new(self.port_naming.clone())
    }

    /// Get the poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Line numbers tried when connecting, in order.
    pub fn scan_range(&self) -> impl Iterator<Item = u16> {
        let first = self.scan_first;
        (0..self.scan_count).map_while(move |i| first.checked_add(i))
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}
