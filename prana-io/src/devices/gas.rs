//! SCD4x CO2 / temperature / humidity sensor
//!
//! The sensor runs in periodic measurement mode (one sample every 5 s). Mode
//! handling and CRC framing belong to the `scd4x` crate; this module only
//! tracks the lifecycle:
//!
//! ```text
//! open fails ──▶ Unavailable (every poll is a no-op)
//! open ok    ──▶ Idle ──start()──▶ Measuring
//!                  │  (start fails: stays Idle, polls continue)
//! ```
//!
//! Measurement is started at most once per process. A poll that finds the
//! ready flag clear reports [`Sample::Empty`] without touching the
//! measurement registers.

use crate::core::handle::{DeviceHandle, Sample};
use crate::core::types::GasReading;
use crate::error::{Error, Result};
use linux_embedded_hal::{Delay, I2cdev};
use scd4x::Scd4x;

/// Sensor that samples continuously once started
pub trait PeriodicSensor: Send {
    fn start_periodic_measurement(&mut self) -> Result<()>;

    /// Whether a new measurement is waiting
    fn data_ready(&mut self) -> Result<bool>;

    /// Read (and consume) the latest measurement
    fn measurement(&mut self) -> Result<GasReading>;
}

/// SCD4x on Linux I2C
pub struct Scd4xSensor {
    inner: Scd4x<I2cdev, Delay>,
}

impl Scd4xSensor {
    /// Open the bus and bring the sensor to a known idle state
    ///
    /// Stopping periodic measurement doubles as a presence check, since the
    /// bus itself opens even when nothing is attached.
    pub fn open(i2c_bus: &str) -> Result<Self> {
        let i2c = I2cdev::new(i2c_bus).map_err(|e| Error::I2c(e.to_string()))?;
        let mut inner = Scd4x::new(i2c, Delay);
        inner.stop_periodic_measurement().map_err(sensor_error)?;
        log::info!("SCD4x found on {}", i2c_bus);
        Ok(Self { inner })
    }
}

fn sensor_error<E: std::fmt::Debug>(err: scd4x::Error<E>) -> Error {
    Error::Sensor(format!("SCD4x: {:?}", err))
}

impl PeriodicSensor for Scd4xSensor {
    fn start_periodic_measurement(&mut self) -> Result<()> {
        self.inner.start_periodic_measurement().map_err(sensor_error)
    }

    fn data_ready(&mut self) -> Result<bool> {
        self.inner.data_ready_status().map_err(sensor_error)
    }

    fn measurement(&mut self) -> Result<GasReading> {
        let data = self.inner.measurement().map_err(sensor_error)?;
        Ok(GasReading {
            co2_ppm: data.co2,
            temperature_c: data.temperature,
            humidity_pct: data.humidity,
        })
    }
}

/// Lifecycle state of the gas sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasSensorState {
    /// Open failed; never retried
    Unavailable,
    /// Connected, periodic measurement not running
    Idle,
    /// Periodic measurement running
    Measuring,
}

/// SCD4x with a soft-failing handle and a one-shot start
pub struct PeriodicGasSensor {
    handle: DeviceHandle<Box<dyn PeriodicSensor>>,
    start_attempted: bool,
    measuring: bool,
}

impl PeriodicGasSensor {
    pub const NAME: &'static str = "SCD40";

    pub fn open(i2c_bus: &str) -> Self {
        let handle = DeviceHandle::open(Self::NAME, || {
            Scd4xSensor::open(i2c_bus).map(|s| Box::new(s) as Box<dyn PeriodicSensor>)
        });
        Self::from_handle(handle)
    }

    pub fn with_sensor<S: PeriodicSensor + 'static>(sensor: S) -> Self {
        Self::from_handle(DeviceHandle::present(Self::NAME, Box::new(sensor)))
    }

    pub fn absent() -> Self {
        Self::from_handle(DeviceHandle::absent(Self::NAME))
    }

    fn from_handle(handle: DeviceHandle<Box<dyn PeriodicSensor>>) -> Self {
        Self {
            handle,
            start_attempted: false,
            measuring: false,
        }
    }

    pub fn state(&self) -> GasSensorState {
        if !self.handle.is_present() {
            GasSensorState::Unavailable
        } else if self.measuring {
            GasSensorState::Measuring
        } else {
            GasSensorState::Idle
        }
    }

    /// Start periodic measurement
    ///
    /// Only the first call talks to the sensor; later calls return the current
    /// state unchanged, so measurement is never restarted.
    pub fn start(&mut self) -> GasSensorState {
        if self.start_attempted {
            log::debug!("SCD40: start already attempted, ignoring");
            return self.state();
        }
        self.start_attempted = true;

        match self.handle.with(|s| s.start_periodic_measurement()) {
            Some(Ok(())) => {
                self.measuring = true;
                log::info!("SCD40: periodic measurement started");
            }
            Some(Err(e)) => log::warn!("SCD40: setup error: {}", e),
            None => log::debug!("SCD40: not connected, nothing to start"),
        }
        self.state()
    }

    /// Read CO2, temperature and humidity if a sample is ready
    pub fn read(&mut self) -> Sample<GasReading> {
        self.handle.poll(|sensor| {
            if !sensor.data_ready()? {
                log::debug!("SCD40: data not ready");
                return Ok(None);
            }
            sensor.measurement().map(Some)
        })
    }
}
