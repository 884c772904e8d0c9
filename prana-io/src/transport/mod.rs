//! Byte-stream transport for the serial lidar link

use crate::error::Result;

mod mock;
mod serial;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Read-side transport for byte-oriented device communication
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 on timeout)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Number of bytes waiting in the input buffer
    fn available(&mut self) -> Result<usize> {
        Ok(0)
    }

    /// Release the underlying device
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
