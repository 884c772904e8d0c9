//! ADS1115 16-bit ADC driver (single-shot, single-ended)
//!
//! Register map:
//!
//! | Pointer | Register   |
//! |---------|------------|
//! | 0x00    | Conversion |
//! | 0x01    | Config     |
//!
//! Config word used for every conversion:
//!
//! ```text
//! 15    14:12      11:9       8      7:5       1:0
//! OS=1  MUX=1xx    PGA=001    MODE=1 DR=100    COMP_QUE=11
//! start AINx/GND   ±4.096 V   single 128 SPS   comparator off
//! ```

use super::{AdcChannel, VoltageSource};
use crate::error::{Error, Result};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

pub const DEFAULT_ADDRESS: u8 = 0x48;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

const CONFIG_OS_START: u16 = 0x8000;
const CONFIG_MUX_SINGLE: u16 = 0x4000;
const CONFIG_PGA_4_096V: u16 = 0x0200;
const CONFIG_MODE_SINGLE: u16 = 0x0100;
const CONFIG_DR_128SPS: u16 = 0x0080;
const CONFIG_COMP_DISABLE: u16 = 0x0003;

/// Full-scale range for PGA=001 (gain 1)
pub const FULL_SCALE_VOLTS: f64 = 4.096;

/// One conversion at 128 SPS takes ~7.8ms
const CONVERSION_TIME_US: u32 = 8_000;
const READY_POLL_US: u32 = 500;
const READY_POLL_ATTEMPTS: u32 = 20;

/// ADS1115 on an embedded-hal I2C bus
pub struct Ads1115<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Ads1115<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    /// Confirm the chip answers by reading its config register
    pub fn probe(&mut self) -> Result<u16> {
        self.read_register(REG_CONFIG)
    }

    /// Config word that starts a single-shot conversion on `channel`
    pub fn config_word(channel: AdcChannel) -> u16 {
        CONFIG_OS_START
            | CONFIG_MUX_SINGLE
            | ((channel.index() as u16) << 12)
            | CONFIG_PGA_4_096V
            | CONFIG_MODE_SINGLE
            | CONFIG_DR_128SPS
            | CONFIG_COMP_DISABLE
    }

    /// Run one conversion and return the signed raw code
    pub fn read_raw(&mut self, channel: AdcChannel) -> Result<i16> {
        let config = Self::config_word(channel);
        let [msb, lsb] = config.to_be_bytes();
        self.i2c
            .write(self.address, &[REG_CONFIG, msb, lsb])
            .map_err(Error::i2c)?;

        self.delay.delay_us(CONVERSION_TIME_US);
        self.wait_ready()?;

        let raw = self.read_register(REG_CONVERSION)?;
        Ok(raw as i16)
    }

    /// Release the bus
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    fn wait_ready(&mut self) -> Result<()> {
        for _ in 0..READY_POLL_ATTEMPTS {
            if self.read_register(REG_CONFIG)? & CONFIG_OS_START != 0 {
                return Ok(());
            }
            self.delay.delay_us(READY_POLL_US);
        }
        Err(Error::Sensor("ADS1115 conversion timed out".to_string()))
    }

    fn read_register(&mut self, register: u8) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(Error::i2c)?;
        Ok(u16::from_be_bytes(buf))
    }
}

/// Convert a raw code to volts for the ±4.096 V range
pub fn raw_to_volts(raw: i16) -> f64 {
    raw as f64 * FULL_SCALE_VOLTS / 32768.0
}

impl<I2C, D> VoltageSource for Ads1115<I2C, D>
where
    I2C: I2c + Send,
    D: DelayNs + Send,
{
    fn voltage(&mut self, channel: AdcChannel) -> Result<f64> {
        let raw = self.read_raw(channel)?;
        log::trace!("ADS1115: {:?} raw={}", channel, raw);
        Ok(raw_to_volts(raw))
    }
}
