use super::*;

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            i2c_address: 0x6B,
            operation_timeout_ms: 50,
            // ADC enabled, one-shot conversion
            adc_boot_control: Some(0xC0),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_file: "/data/chargeguard/settings.json".to_string(),
            history_file: "/data/chargeguard/history.json".to_string(),
            history_capacity: 50,
        }
    }
}

impl Default for FlapConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            threshold_ms: 4000,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loop_idle_ms: 1,
            watchdog_interval_ms: 30_000,
            subscriber_cleanup_interval_ms: 1000,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { command_queue: 32 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/chargeguard.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            storage: StorageConfig::default(),
            flap: FlapConfig::default(),
            timing: TimingConfig::default(),
            controller: ControllerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
