//! Configuration management for ChargeGuard
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{ChargerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Two-wire bus parameters
    pub bus: BusConfig,

    /// Persistent storage locations
    pub storage: StorageConfig,

    /// Battery-removal (flap) detection parameters
    pub flap: FlapConfig,

    /// Control loop timing
    pub timing: TimingConfig,

    /// Controller actor parameters
    pub controller: ControllerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Two-wire bus parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// 7-bit I2C address of the charger
    pub i2c_address: u8,

    /// Per-transaction timeout in milliseconds
    pub operation_timeout_ms: u64,

    /// Value written to the ADC control register after settings replay.
    /// `None` leaves the ADC untouched.
    pub adc_boot_control: Option<u8>,
}

/// Persistent storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the last-applied value per field
    pub settings_file: String,

    /// JSON file holding the event history
    pub history_file: String,

    /// Maximum number of history entries kept
    pub history_capacity: usize,
}

/// Battery-removal (flap) detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlapConfig {
    /// Number of charge-status changes that must fit inside the threshold
    pub window_size: usize,

    /// Maximum span in milliseconds between oldest and newest change
    pub threshold_ms: u64,
}

/// Control loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Loop idle sleep in milliseconds
    pub loop_idle_ms: u64,

    /// Charger watchdog heartbeat interval in milliseconds
    pub watchdog_interval_ms: u64,

    /// Interval for dropping closed notification subscribers
    pub subscriber_cleanup_interval_ms: u64,
}

/// Controller actor parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Capacity of the controller command queue
    pub command_queue: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console level override
    pub console_level: Option<String>,

    /// Optional file level override
    pub file_level: Option<String>,

    /// Path to log file (or directory)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = [
            "chargeguard.yaml",
            "/data/chargeguard.yaml",
            "/etc/chargeguard/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bus.i2c_address == 0 || self.bus.i2c_address > 0x7F {
            return Err(ChargerError::validation(
                "bus.i2c_address",
                "Must be a non-zero 7-bit address",
            ));
        }

        if self.bus.operation_timeout_ms == 0 {
            return Err(ChargerError::validation(
                "bus.operation_timeout_ms",
                "Must be greater than 0",
            ));
        }

        if self.storage.settings_file.is_empty() {
            return Err(ChargerError::validation(
                "storage.settings_file",
                "Path cannot be empty",
            ));
        }

        if self.storage.history_file.is_empty() {
            return Err(ChargerError::validation(
                "storage.history_file",
                "Path cannot be empty",
            ));
        }

        if self.storage.history_capacity == 0 {
            return Err(ChargerError::validation(
                "storage.history_capacity",
                "Must be greater than 0",
            ));
        }

        // A single sample has no span to compare against the threshold
        if self.flap.window_size < 2 {
            return Err(ChargerError::validation(
                "flap.window_size",
                "Must be at least 2",
            ));
        }

        if self.flap.threshold_ms == 0 {
            return Err(ChargerError::validation(
                "flap.threshold_ms",
                "Must be greater than 0",
            ));
        }

        if self.timing.watchdog_interval_ms == 0 {
            return Err(ChargerError::validation(
                "timing.watchdog_interval_ms",
                "Must be greater than 0",
            ));
        }

        if self.timing.subscriber_cleanup_interval_ms == 0 {
            return Err(ChargerError::validation(
                "timing.subscriber_cleanup_interval_ms",
                "Must be greater than 0",
            ));
        }

        if self.controller.command_queue == 0 {
            return Err(ChargerError::validation(
                "controller.command_queue",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}
