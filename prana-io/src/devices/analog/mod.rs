//! MQ-9 gas and AO-O2 oxygen sensors behind an ADS1115
//!
//! Both sensors are plain analog outputs. The MQ-9 sits on A0 and the AO-O2
//! on A1; each poll converts both and applies the fixed linear formulas in
//! [`crate::core::types`].

pub mod ads1115;

use crate::core::handle::{DeviceHandle, Sample};
use crate::core::types::AnalogReading;
use crate::error::{Error, Result};
use ads1115::Ads1115;
use linux_embedded_hal::{Delay, I2cdev};

/// Single-ended ADC input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    A0,
    A1,
    A2,
    A3,
}

impl AdcChannel {
    pub fn index(self) -> u8 {
        match self {
            AdcChannel::A0 => 0,
            AdcChannel::A1 => 1,
            AdcChannel::A2 => 2,
            AdcChannel::A3 => 3,
        }
    }
}

/// Anything that can sample a voltage on a channel
pub trait VoltageSource: Send {
    fn voltage(&mut self, channel: AdcChannel) -> Result<f64>;
}

pub const GAS_CHANNEL: AdcChannel = AdcChannel::A0;
pub const O2_CHANNEL: AdcChannel = AdcChannel::A1;

/// Gas and oxygen channels sharing one ADC handle
pub struct AnalogChannelPair {
    adc: DeviceHandle<Box<dyn VoltageSource>>,
    gas_channel: AdcChannel,
    o2_channel: AdcChannel,
}

impl AnalogChannelPair {
    pub const NAME: &'static str = "ADS1115";

    /// Open the I2C bus and probe the ADC; failure leaves the pair absent
    pub fn open(i2c_bus: &str, address: u8) -> Self {
        let adc = DeviceHandle::open(Self::NAME, || {
            let i2c = I2cdev::new(i2c_bus).map_err(|e| Error::I2c(e.to_string()))?;
            let mut adc = Ads1115::new(i2c, Delay, address);
            adc.probe()?;
            log::info!("ADS1115 found at {:#04x} on {}", address, i2c_bus);
            Ok(Box::new(adc) as Box<dyn VoltageSource>)
        });
        Self::from_handle(adc)
    }

    pub fn with_source<S: VoltageSource + 'static>(source: S) -> Self {
        Self::from_handle(DeviceHandle::present(Self::NAME, Box::new(source)))
    }

    pub fn absent() -> Self {
        Self::from_handle(DeviceHandle::absent(Self::NAME))
    }

    fn from_handle(adc: DeviceHandle<Box<dyn VoltageSource>>) -> Self {
        Self {
            adc,
            gas_channel: GAS_CHANNEL,
            o2_channel: O2_CHANNEL,
        }
    }

    pub fn is_present(&self) -> bool {
        self.adc.is_present()
    }

    /// Sample both channels and convert them
    ///
    /// Voltages are not range-checked. A failure on either channel skips the
    /// whole reading for this cycle.
    pub fn read(&mut self) -> Sample<AnalogReading> {
        let (gas_channel, o2_channel) = (self.gas_channel, self.o2_channel);
        self.adc.poll(|adc| {
            let gas_voltage = adc.voltage(gas_channel)?;
            let o2_voltage = adc.voltage(o2_channel)?;
            Ok(Some(AnalogReading::from_voltages(gas_voltage, o2_voltage)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::mock::MockAdc;
    use approx::assert_relative_eq;

    #[test]
    fn test_channel_index() {
        assert_eq!(AdcChannel::A0.index(), 0);
        assert_eq!(AdcChannel::A3.index(), 3);
    }

    #[test]
    fn test_absent_pair() {
        let mut pair = AnalogChannelPair::absent();
        assert!(!pair.is_present());
        assert_eq!(pair.read(), Sample::Unavailable);
    }

    #[test]
    fn test_reading_conversion() {
        let adc = MockAdc::new();
        adc.set_voltage(GAS_CHANNEL, 1.2);
        adc.set_voltage(O2_CHANNEL, 0.0105);
        let mut pair = AnalogChannelPair::with_source(adc.clone());

        let sample = pair.read();
        let reading = sample.value().unwrap();
        assert_relative_eq!(reading.gas_voltage, 1.2);
        assert_relative_eq!(reading.gas_concentration, 120.0, epsilon = 1e-9);
        assert_relative_eq!(reading.o2_voltage, 0.0105);
        assert_relative_eq!(reading.o2_percent, 21.945, epsilon = 1e-9);
        assert_eq!(adc.reads(), vec![GAS_CHANNEL, O2_CHANNEL]);
    }

    #[test]
    fn test_channel_error_skips_cycle_only() {
        let adc = MockAdc::new();
        adc.set_voltage(GAS_CHANNEL, 0.5);
        adc.set_voltage(O2_CHANNEL, 0.01);
        adc.set_fail(true);
        let mut pair = AnalogChannelPair::with_source(adc.clone());

        assert!(matches!(pair.read(), Sample::Failed(_)));
        adc.set_fail(false);
        assert!(pair.read().is_value());
    }
}
