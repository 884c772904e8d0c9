//! Lidar line source over UART
//!
//! The lidar's output is treated as opaque text: each poll drains at most one
//! newline-terminated record and hands back the decoded, trimmed line. Bytes
//! that are not valid UTF-8 are dropped.

use crate::core::handle::{DeviceHandle, Sample};
use crate::error::Result;
use crate::transport::{SerialTransport, Transport};
use std::time::Duration;

/// Longest record kept; the rest of an overlong line is discarded in the same poll
const MAX_LINE_LEN: usize = 4096;

/// Serial lidar that yields one text line per poll
pub struct SerialLineSource {
    handle: DeviceHandle<Box<dyn Transport>>,
}

impl SerialLineSource {
    pub const NAME: &'static str = "Lidar";

    /// Open the serial port; failure leaves the source absent
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Self {
        let handle = DeviceHandle::open(Self::NAME, || {
            SerialTransport::open(path, baud_rate, timeout)
                .map(|t| Box::new(t) as Box<dyn Transport>)
        });
        Self { handle }
    }

    /// Wrap an existing transport (mock or pre-opened port)
    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        Self {
            handle: DeviceHandle::present(Self::NAME, Box::new(transport)),
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

    /// Read at most one line
    ///
    /// Returns [`Sample::Empty`] when nothing is buffered or the line is blank.
    pub fn read(&mut self) -> Sample<String> {
        self.handle.poll(|transport| {
            if transport.available()? == 0 {
                return Ok(None);
            }

            let record = read_record(transport.as_mut())?;
            let line = decode_lossy(&record);
            let line = line.trim();
            log::trace!("Lidar: {} bytes -> {:?}", record.len(), line);

            if line.is_empty() {
                Ok(None)
            } else {
                Ok(Some(line.to_string()))
            }
        })
    }

    /// Release the port. Returns `true` if a port was open.
    pub fn close(&mut self) -> bool {
        let Some(mut transport) = self.handle.release() else {
            return false;
        };
        if let Err(e) = transport.close() {
            log::warn!("Lidar: error while closing serial port: {}", e);
        }
        true
    }
}

/// Read bytes up to and including `\n`, or until the transport times out
///
/// At most [`MAX_LINE_LEN`] bytes are kept. Past that, bytes are consumed and
/// dropped through the terminating `\n` so the tail never surfaces as a line
/// of its own on the next poll.
fn read_record(transport: &mut dyn Transport) -> Result<Vec<u8>> {
    let mut record = Vec::new();
    let mut byte = [0u8; 1];
    let mut dropped = 0usize;

    loop {
        if transport.read(&mut byte)? == 0 {
            break;
        }
        if byte[0] == b'\n' {
            record.push(byte[0]);
            break;
        }
        if record.len() < MAX_LINE_LEN {
            record.push(byte[0]);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::debug!("Lidar: record over {} bytes, dropped {}", MAX_LINE_LEN, dropped);
    }
    Ok(record)
}

/// Decode UTF-8, silently dropping invalid sequences
pub fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
