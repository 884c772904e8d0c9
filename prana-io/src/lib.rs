//! PranaIO - sensor polling daemon for a Raspberry Pi air-quality rig
//!
//! Polls a serial lidar, a PMW3901 optical-flow sensor (SPI), MQ-9 and
//! AO-O2 analog sensors behind an ADS1115 (I2C) and an SCD4x CO2 sensor
//! (I2C), printing one block of readings per cycle.
//!
//! Every device is opened once at startup. A device that fails to open stays
//! absent for the life of the process and is reported as unavailable; the
//! other devices keep polling.

pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod poller;
pub mod report;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use crate::core::handle::{DeviceHandle, Sample};
pub use error::{Error, Result};
pub use poller::Poller;
