//! Polling loop
//!
//! Sequence:
//!
//! 1. Stabilization delay, then start the gas sensor's periodic measurement once.
//! 2. Each cycle reads lidar, optical flow, analog pair and gas sensor in
//!    that order, prints one block, and sleeps the poll interval.
//! 3. When the running flag clears, print the goodbye line and release the
//!    serial and SPI handles.
//!
//! The running flag is checked between cycles and while sleeping, never in
//! the middle of a device read.

use crate::config::{Config, TimingConfig};
use crate::devices::{
    AnalogChannelPair, GasSensorState, OpticalFlowSensor, PeriodicGasSensor, SerialLineSource,
};
use crate::error::Result;
use crate::report::CycleReport;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Longest single sleep while waiting, so an interrupt is noticed promptly
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Handles released by one [`Poller::shutdown`] call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Released {
    pub serial: bool,
    pub spi: bool,
}

/// Coordinator owning every device component
pub struct Poller {
    lidar: SerialLineSource,
    optical_flow: OpticalFlowSensor,
    analog: AnalogChannelPair,
    gas: PeriodicGasSensor,
    startup_delay: Duration,
    poll_interval: Duration,
}

impl Poller {
    pub fn new(
        lidar: SerialLineSource,
        optical_flow: OpticalFlowSensor,
        analog: AnalogChannelPair,
        gas: PeriodicGasSensor,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            lidar,
            optical_flow,
            analog,
            gas,
            startup_delay: Duration::from_millis(timing.startup_delay_ms),
            poll_interval: Duration::from_millis(timing.poll_interval_ms),
        }
    }

    /// Open every device from configuration; absent devices are logged, not fatal
    pub fn open(config: &Config) -> Self {
        let lidar = SerialLineSource::open(
            &config.lidar.port,
            config.lidar.baud_rate,
            Duration::from_millis(config.lidar.timeout_ms),
        );
        let optical_flow = OpticalFlowSensor::open(
            config.optical_flow.bus,
            config.optical_flow.device,
            config.optical_flow.max_speed_hz,
        );
        let analog = AnalogChannelPair::open(&config.analog.i2c_bus, config.analog.address);
        let gas = PeriodicGasSensor::open(&config.gas_sensor.i2c_bus);

        log::info!(
            "Devices: lidar={} optical_flow={} adc={} scd4x={}",
            lidar.is_present(),
            optical_flow.is_present(),
            analog.is_present(),
            gas.state() != GasSensorState::Unavailable
        );

        Self::new(lidar, optical_flow, analog, gas, &config.timing)
    }

    /// Start periodic measurement on the gas sensor (first call only)
    pub fn start(&mut self) -> GasSensorState {
        self.gas.start()
    }

    /// Read every device once, in fixed order
    pub fn poll_once(&mut self) -> CycleReport {
        CycleReport {
            lidar: self.lidar.read(),
            optical_flow: self.optical_flow.read(),
            analog: self.analog.read(),
            gas: self.gas.read(),
        }
    }

    /// Release the serial and SPI handles
    ///
    /// Reports which handles this call released; later calls release nothing.
    pub fn shutdown(&mut self) -> Released {
        let released = Released {
            serial: self.lidar.close(),
            spi: self.optical_flow.close(),
        };
        if released.serial {
            log::info!("Lidar serial port closed");
        }
        if released.spi {
            log::info!("SPI bus closed");
        }
        released
    }

    /// Run until `running` clears, writing readings to `out`
    ///
    /// Returns the number of completed cycles.
    pub fn run<W: Write>(&mut self, running: &AtomicBool, out: &mut W) -> Result<u64> {
        writeln!(out, "Initializing sensors...")?;
        let settled = sleep_while_running(self.startup_delay, running);

        if settled && self.start() == GasSensorState::Measuring {
            writeln!(out, "SCD40: Measurement started.")?;
        }

        let mut cycles = 0u64;
        while settled && running.load(Ordering::Relaxed) {
            let started = Instant::now();
            let report = self.poll_once();
            writeln!(out, "{}", report)?;
            out.flush()?;
            cycles += 1;
            log::debug!("Cycle {} took {:?}", cycles, started.elapsed());

            sleep_while_running(self.poll_interval, running);
        }

        writeln!(out)?;
        writeln!(out, "Exiting gracefully. Goodbye!")?;
        let released = self.shutdown();
        if released.serial {
            writeln!(out, "Lidar serial port closed.")?;
        }
        if released.spi {
            writeln!(out, "SPI bus closed.")?;
        }
        out.flush()?;

        Ok(cycles)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sleep for `duration`, returning early once `running` clears
///
/// Returns `true` if the full duration elapsed with `running` still set.
pub fn sleep_while_running(duration: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if !running.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}
