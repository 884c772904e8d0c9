//! PMW3901 optical-flow sensor over SPI
//!
//! Only the bus plumbing is real. The read sends a single `0x00` command byte
//! and clocks in ten bytes; the PMW3901 register protocol (power-up sequence,
//! motion burst) is not implemented, so the returned bytes are not motion
//! data.

use crate::core::handle::{DeviceHandle, Sample};
use crate::error::Result;
use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use std::io::Read;

/// Command byte written before each read
pub const READ_COMMAND: u8 = 0x00;

/// Bytes read back after the command
pub const READ_LEN: usize = 10;

/// Full-duplex SPI link
pub trait SpiLink: Send {
    /// Clock `tx` out and return what was clocked in
    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>>;

    /// Clock in `buffer.len()` bytes
    fn read(&mut self, buffer: &mut [u8]) -> Result<()>;

    /// Release the bus
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Linux spidev link (`/dev/spidev<bus>.<device>`)
pub struct SpidevLink {
    path: String,
    spi: Spidev,
}

impl SpidevLink {
    pub fn open(bus: u8, device: u8, max_speed_hz: u32) -> Result<Self> {
        let path = format!("/dev/spidev{}.{}", bus, device);
        let mut spi = Spidev::open(&path)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(max_speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)?;

        log::info!("Opened SPI device: {} at {} Hz", path, max_speed_hz);
        Ok(Self { path, spi })
    }
}

impl SpiLink for SpidevLink {
    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        let mut rx = vec![0u8; tx.len()];
        {
            let mut transfer = SpidevTransfer::read_write(tx, &mut rx);
            self.spi.transfer(&mut transfer)?;
        }
        Ok(rx)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<()> {
        self.spi.read_exact(buffer)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        log::debug!("Closing SPI device: {}", self.path);
        Ok(())
    }
}

/// Optical-flow sensor with a soft-failing SPI handle
pub struct OpticalFlowSensor {
    handle: DeviceHandle<Box<dyn SpiLink>>,
}

impl OpticalFlowSensor {
    pub const NAME: &'static str = "PMW3901";

    /// Open the SPI bus; failure leaves the sensor absent
    pub fn open(bus: u8, device: u8, max_speed_hz: u32) -> Self {
        let handle = DeviceHandle::open(Self::NAME, || {
            SpidevLink::open(bus, device, max_speed_hz).map(|l| Box::new(l) as Box<dyn SpiLink>)
        });
        Self { handle }
    }

    pub fn with_link<L: SpiLink + 'static>(link: L) -> Self {
        Self {
            handle: DeviceHandle::present(Self::NAME, Box::new(link)),
        }
    }

    pub fn absent() -> Self {
        Self {
            handle: DeviceHandle::absent(Self::NAME),
        }
    }

    pub fn is_present(&self) -> bool {
        self.handle.is_present()
    }

    /// Send the command byte and read back [`READ_LEN`] raw bytes
    pub fn read(&mut self) -> Sample<Vec<u8>> {
        self.handle.poll(|spi| {
            spi.transfer(&[READ_COMMAND])?;
            let mut data = vec![0u8; READ_LEN];
            spi.read(&mut data)?;
            Ok(Some(data))
        })
    }

    /// Release the bus. Returns `true` if a bus was open.
    pub fn close(&mut self) -> bool {
        let Some(mut spi) = self.handle.release() else {
            return false;
        };
        if let Err(e) = spi.close() {
            log::warn!("PMW3901: error while closing SPI bus: {}", e);
        }
        true
    }
}
