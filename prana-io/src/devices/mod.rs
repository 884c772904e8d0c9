//! Device components
//!
//! Each component owns one soft-failing [`DeviceHandle`](crate::core::handle::DeviceHandle)
//! and exposes `read()` returning a [`Sample`](crate::core::handle::Sample).
//!
//! | Component | Device | Bus |
//! |-----------|--------|-----|
//! | [`lidar::SerialLineSource`] | 360° lidar | UART |
//! | [`optical_flow::OpticalFlowSensor`] | PMW3901 | SPI |
//! | [`analog::AnalogChannelPair`] | MQ-9 + AO-O2 via ADS1115 | I2C |
//! | [`gas::PeriodicGasSensor`] | SCD4x | I2C |

pub mod analog;
pub mod gas;
pub mod lidar;
pub mod mock;
pub mod optical_flow;

pub use analog::AnalogChannelPair;
pub use gas::{GasSensorState, PeriodicGasSensor};
pub use lidar::SerialLineSource;
pub use optical_flow::OpticalFlowSensor;
