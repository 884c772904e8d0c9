//! Configuration for PranaIO
//!
//! Every field has a built-in default matching the reference Raspberry Pi
//! wiring, so the daemon runs without any file. A TOML file can override
//! any subset of fields.

use crate::devices::analog::ads1115;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub lidar: LidarConfig,
    pub optical_flow: OpticalFlowConfig,
    pub analog: AnalogConfig,
    pub gas_sensor: GasSensorConfig,
    pub timing: TimingConfig,
    pub logging: LoggingConfig,
}

/// Lidar UART settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LidarConfig {
    /// Serial device path (e.g. `/dev/ttyUSB0` or `/dev/ttyS0`)
    pub port: String,
    pub baud_rate: u32,
    /// Read timeout for one line
    pub timeout_ms: u64,
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            timeout_ms: 1000,
        }
    }
}

/// PMW3901 optical-flow SPI settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpticalFlowConfig {
    /// SPI bus index (`/dev/spidev<bus>.<device>`)
    pub bus: u8,
    /// Chip-select index on the bus
    pub device: u8,
    pub max_speed_hz: u32,
}

impl Default for OpticalFlowConfig {
    fn default() -> Self {
        Self {
            bus: 0,
            device: 0,
            max_speed_hz: 1_000_000,
        }
    }
}

/// ADS1115 ADC carrying the MQ-9 and AO-O2 analog outputs
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalogConfig {
    pub i2c_bus: String,
    /// 7-bit I2C address (0x48 with ADDR tied to GND)
    pub address: u8,
}

impl Default for AnalogConfig {
    fn default() -> Self {
        Self {
            i2c_bus: "/dev/i2c-1".to_string(),
            address: ads1115::DEFAULT_ADDRESS,
        }
    }
}

/// SCD4x CO2 sensor (fixed address 0x62)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasSensorConfig {
    pub i2c_bus: String,
}

impl Default for GasSensorConfig {
    fn default() -> Self {
        Self {
            i2c_bus: "/dev/i2c-1".to_string(),
        }
    }
}

/// Polling cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Stabilization delay before the first activity
    pub startup_delay_ms: u64,
    /// Sleep between poll cycles
    pub poll_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: 5000,
            poll_interval_ms: 5000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log filter (trace, debug, info, warn, error); `RUST_LOG` wins
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.lidar.port.is_empty() {
            return Err(Error::Config("lidar.port must not be empty".to_string()));
        }
        if self.lidar.baud_rate == 0 {
            return Err(Error::Config("lidar.baud_rate must be non-zero".to_string()));
        }
        if self.optical_flow.max_speed_hz == 0 {
            return Err(Error::Config(
                "optical_flow.max_speed_hz must be non-zero".to_string(),
            ));
        }
        if self.analog.address > 0x7F {
            return Err(Error::Config(format!(
                "analog.address {:#04x} is not a 7-bit I2C address",
                self.analog.address
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.lidar.port, "/dev/ttyUSB0");
        assert_eq!(config.lidar.baud_rate, 115200);
        assert_eq!(config.lidar.timeout_ms, 1000);
        assert_eq!(config.optical_flow.bus, 0);
        assert_eq!(config.optical_flow.device, 0);
        assert_eq!(config.optical_flow.max_speed_hz, 1_000_000);
        assert_eq!(config.analog.address, ads1115::DEFAULT_ADDRESS);
        assert_eq!(config.gas_sensor.i2c_bus, "/dev/i2c-1");
        assert_eq!(config.timing.startup_delay_ms, 5000);
        assert_eq!(config.timing.poll_interval_ms, 5000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_content = r#"
[lidar]
port = "/dev/ttyS0"

[timing]
poll_interval_ms = 1000
"#;

        let config = Config::from_toml(toml_content).unwrap();
        assert_eq!(config.lidar.port, "/dev/ttyS0");
        assert_eq!(config.lidar.baud_rate, 115200);
        assert_eq!(config.timing.poll_interval_ms, 1000);
        assert_eq!(config.timing.startup_delay_ms, 5000);
        assert_eq!(config.analog.i2c_bus, "/dev/i2c-1");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.lidar.port, Config::default().lidar.port);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_toml("[lidar]\nbaud_rate = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_toml("[analog]\naddress = 200\n").unwrap_err();
        assert!(err.to_string().contains("0xc8"));

        let err = Config::from_toml("[optical_flow]\nmax_speed_hz = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("[lidar\nport = 1").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analog]\naddress = 0x49\n\n[logging]\nlevel = \"debug\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.analog.address, 0x49);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/prana.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_string = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_string.contains("[lidar]"));
        assert!(toml_string.contains("[optical_flow]"));
        assert!(toml_string.contains("[gas_sensor]"));
        assert!(toml_string.contains("port = \"/dev/ttyUSB0\""));
    }
}
