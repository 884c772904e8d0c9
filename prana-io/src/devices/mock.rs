//! Mock device backends for hardware-free runs and tests
//!
//! Each mock is a cheap clone over shared state, so a test can keep one copy
//! to script behavior and inspect calls while the component owns the other.

use super::analog::{AdcChannel, VoltageSource};
use super::gas::PeriodicSensor;
use super::optical_flow::SpiLink;
use crate::core::types::GasReading;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

fn injected_failure(device: &str) -> Error {
    Error::Io(std::io::Error::other(format!("{} mock failure", device)))
}

/// Mock SPI link; reads return injected bytes, then zeros
#[derive(Clone, Default)]
pub struct MockSpi {
    inner: Arc<Mutex<MockSpiInner>>,
}

#[derive(Default)]
struct MockSpiInner {
    read_buffer: VecDeque<u8>,
    transfers: Vec<Vec<u8>>,
    fail: bool,
    close_count: usize,
}

impl MockSpi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().read_buffer.extend(data);
    }

    /// Every `tx` buffer passed to `transfer`
    pub fn transferred(&self) -> Vec<Vec<u8>> {
        self.inner.lock().transfers.clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.inner.lock().fail = fail;
    }

    pub fn close_count(&self) -> usize {
        self.inner.lock().close_count
    }
}

impl SpiLink for MockSpi {
    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock();
        if inner.fail {
            return Err(injected_failure("SPI"));
        }
        inner.transfers.push(tx.to_vec());
        Ok(vec![0u8; tx.len()])
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail {
            return Err(injected_failure("SPI"));
        }
        for slot in buffer.iter_mut() {
            *slot = inner.read_buffer.pop_front().unwrap_or(0);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.inner.lock().close_count += 1;
        Ok(())
    }
}

/// Mock ADC with a fixed voltage per channel (0 V if unset)
#[derive(Clone, Default)]
pub struct MockAdc {
    inner: Arc<Mutex<MockAdcInner>>,
}

#[derive(Default)]
struct MockAdcInner {
    voltages: HashMap<u8, f64>,
    reads: Vec<AdcChannel>,
    fail: bool,
}

impl MockAdc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_voltage(&self, channel: AdcChannel, volts: f64) {
        self.inner.lock().voltages.insert(channel.index(), volts);
    }

    pub fn set_fail(&self, fail: bool) {
        self.inner.lock().fail = fail;
    }

    /// Channels sampled so far, in order
    pub fn reads(&self) -> Vec<AdcChannel> {
        self.inner.lock().reads.clone()
    }
}

impl VoltageSource for MockAdc {
    fn voltage(&mut self, channel: AdcChannel) -> Result<f64> {
        let mut inner = self.inner.lock();
        if inner.fail {
            return Err(injected_failure("ADC"));
        }
        inner.reads.push(channel);
        Ok(inner.voltages.get(&channel.index()).copied().unwrap_or(0.0))
    }
}

/// Mock periodic gas sensor; not ready until told otherwise
#[derive(Clone, Default)]
pub struct MockGasSensor {
    inner: Arc<Mutex<MockGasInner>>,
}

#[derive(Default)]
struct MockGasInner {
    ready: bool,
    measurement: Option<GasReading>,
    fail_start: bool,
    fail_reads: bool,
    start_calls: usize,
    data_ready_calls: usize,
    measurement_calls: usize,
}

impl MockGasSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.inner.lock().ready = ready;
    }

    pub fn set_measurement(&self, reading: GasReading) {
        self.inner.lock().measurement = Some(reading);
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.inner.lock().fail_start = fail;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    pub fn start_calls(&self) -> usize {
        self.inner.lock().start_calls
    }

    pub fn data_ready_calls(&self) -> usize {
        self.inner.lock().data_ready_calls
    }

    pub fn measurement_calls(&self) -> usize {
        self.inner.lock().measurement_calls
    }
}

impl PeriodicSensor for MockGasSensor {
    fn start_periodic_measurement(&mut self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.start_calls += 1;
        if inner.fail_start {
            return Err(Error::Sensor("mock start failure".to_string()));
        }
        Ok(())
    }

    fn data_ready(&mut self) -> Result<bool> {
        let mut inner = self.inner.lock();
        inner.data_ready_calls += 1;
        if inner.fail_reads {
            return Err(Error::Sensor("mock read failure".to_string()));
        }
        Ok(inner.ready)
    }

    fn measurement(&mut self) -> Result<GasReading> {
        let mut inner = self.inner.lock();
        inner.measurement_calls += 1;
        if inner.fail_reads {
            return Err(Error::Sensor("mock read failure".to_string()));
        }
        inner
            .measurement
            .ok_or_else(|| Error::Sensor("no measurement scripted".to_string()))
    }
}
