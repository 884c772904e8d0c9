//! End-to-end polling tests against mock devices.

use prana_io::Sample;
use prana_io::config::TimingConfig;
use prana_io::core::types::GasReading;
use prana_io::devices::analog::{GAS_CHANNEL, O2_CHANNEL};
use prana_io::devices::mock::{MockAdc, MockGasSensor, MockSpi};
use prana_io::devices::{
    AnalogChannelPair, GasSensorState, OpticalFlowSensor, PeriodicGasSensor, SerialLineSource,
};
use prana_io::poller::{Poller, Released};
use prana_io::transport::MockTransport;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

struct Rig {
    serial: MockTransport,
    spi: MockSpi,
    adc: MockAdc,
    gas: MockGasSensor,
}

impl Rig {
    fn new() -> Self {
        Self {
            serial: MockTransport::new(),
            spi: MockSpi::new(),
            adc: MockAdc::new(),
            gas: MockGasSensor::new(),
        }
    }

    fn poller(&self, interval_ms: u64) -> Poller {
        Poller::new(
            SerialLineSource::with_transport(self.serial.clone()),
            OpticalFlowSensor::with_link(self.spi.clone()),
            AnalogChannelPair::with_source(self.adc.clone()),
            PeriodicGasSensor::with_sensor(self.gas.clone()),
            &TimingConfig {
                startup_delay_ms: 0,
                poll_interval_ms: interval_ms,
            },
        )
    }
}

#[test]
fn test_full_cycle_with_all_devices() {
    let rig = Rig::new();
    rig.serial.inject_read(b"THETA 12.0 DIST 0.85\n");
    rig.spi.inject_read(&[9; 10]);
    rig.adc.set_voltage(GAS_CHANNEL, 1.2);
    rig.adc.set_voltage(O2_CHANNEL, 0.0105);
    rig.gas.set_ready(true);
    rig.gas.set_measurement(GasReading {
        co2_ppm: 800,
        temperature_c: 24.0,
        humidity_pct: 55.0,
    });

    let mut poller = rig.poller(0);
    assert_eq!(poller.start(), GasSensorState::Measuring);

    let report = poller.poll_once();
    assert_eq!(report.lidar, Sample::Value("THETA 12.0 DIST 0.85".to_string()));
    assert_eq!(report.optical_flow, Sample::Value(vec![9; 10]));
    let analog = report.analog.value().unwrap();
    assert!((analog.gas_concentration - 120.0).abs() < 1e-9);
    assert!((analog.o2_percent - 21.945).abs() < 1e-9);
    assert_eq!(report.gas.value().unwrap().co2_ppm, 800);
}

#[test]
fn test_spi_absent_other_devices_still_polled() {
    let rig = Rig::new();
    rig.serial.inject_read(b"a\nb\nc\n");
    let mut poller = Poller::new(
        SerialLineSource::with_transport(rig.serial.clone()),
        OpticalFlowSensor::absent(),
        AnalogChannelPair::with_source(rig.adc.clone()),
        PeriodicGasSensor::with_sensor(rig.gas.clone()),
        &TimingConfig::default(),
    );
    poller.start();

    for expected in ["a", "b", "c"] {
        let report = poller.poll_once();
        assert_eq!(report.optical_flow, Sample::Unavailable);
        assert_eq!(report.lidar, Sample::Value(expected.to_string()));
        assert!(report.analog.is_value());
        assert_eq!(report.gas, Sample::Empty);
    }
    assert_eq!(rig.adc.reads().len(), 6);
    assert_eq!(rig.gas.data_ready_calls(), 3);

    assert_eq!(
        poller.shutdown(),
        Released {
            serial: true,
            spi: false
        }
    );
}

#[test]
fn test_not_ready_five_cycles_never_restarts() {
    let rig = Rig::new();
    let mut poller = rig.poller(0);
    poller.start();

    for _ in 0..5 {
        let report = poller.poll_once();
        assert_eq!(report.gas, Sample::Empty);
        assert!(report.lines().contains(&"SCD40 data not ready.".to_string()));
    }
    poller.start();

    assert_eq!(rig.gas.start_calls(), 1);
    assert_eq!(rig.gas.measurement_calls(), 0);
}

#[test]
fn test_shutdown_exactly_once() {
    let rig = Rig::new();
    let mut poller = rig.poller(0);

    assert_eq!(
        poller.shutdown(),
        Released {
            serial: true,
            spi: true
        }
    );
    assert_eq!(poller.shutdown(), Released::default());
    drop(poller);

    assert_eq!(rig.serial.close_count(), 1);
    assert_eq!(rig.spi.close_count(), 1);
}

#[test]
fn test_drop_releases_handles() {
    let rig = Rig::new();
    drop(rig.poller(0));
    assert_eq!(rig.serial.close_count(), 1);
    assert_eq!(rig.spi.close_count(), 1);
}

#[test]
fn test_interrupt_during_startup_skips_measurement_start() {
    let rig = Rig::new();
    rig.serial.inject_read(b"never read\n");
    let mut poller = Poller::new(
        SerialLineSource::with_transport(rig.serial.clone()),
        OpticalFlowSensor::with_link(rig.spi.clone()),
        AnalogChannelPair::with_source(rig.adc.clone()),
        PeriodicGasSensor::with_sensor(rig.gas.clone()),
        &TimingConfig {
            startup_delay_ms: 5_000,
            poll_interval_ms: 0,
        },
    );

    let running = AtomicBool::new(false);
    let mut out = Vec::new();
    let cycles = poller.run(&running, &mut out).unwrap();

    assert_eq!(cycles, 0);
    assert_eq!(rig.gas.start_calls(), 0);
    assert_eq!(rig.gas.data_ready_calls(), 0);
    assert!(rig.adc.reads().is_empty());

    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "Initializing sensors...\n\nExiting gracefully. Goodbye!\n\
         Lidar serial port closed.\nSPI bus closed.\n"
    );
    assert_eq!(rig.serial.close_count(), 1);
    assert_eq!(rig.spi.close_count(), 1);
}

#[test]
fn test_run_until_interrupted() {
    let rig = Rig::new();
    rig.serial.inject_read(b"first line\n");
    let mut poller = rig.poller(10);

    let running = Arc::new(AtomicBool::new(true));
    let stopper = {
        let running = Arc::clone(&running);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            running.store(false, Ordering::Relaxed);
        })
    };

    let mut out = Vec::new();
    let cycles = poller.run(&running, &mut out).unwrap();
    stopper.join().unwrap();

    assert!(cycles >= 1);
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Initializing sensors...\nSCD40: Measurement started.\n"));
    assert_eq!(
        text.matches("--- Sensor Readings ---").count() as u64,
        cycles
    );
    assert!(text.contains("Lidar Raw Data: first line"));
    assert!(text.contains("Exiting gracefully. Goodbye!"));
    assert!(text.ends_with("Lidar serial port closed.\nSPI bus closed.\n"));

    assert_eq!(rig.gas.start_calls(), 1);
    assert_eq!(rig.serial.close_count(), 1);
    assert_eq!(rig.spi.close_count(), 1);
}
