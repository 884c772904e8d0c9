//! Soft-failing device handle and per-read outcome.
//!
//! A [`DeviceHandle`] is opened once at startup. If opening fails the error is
//! logged and the handle stays absent for the rest of the process; it is never
//! retried. Every read goes through [`DeviceHandle::poll`], which turns the
//! device call into a [`Sample`] so one failing device cannot stop the others.

use crate::error::Result;

/// Outcome of one read attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Sample<T> {
    /// Device produced a reading
    Value(T),
    /// Device is present but had nothing to report this cycle
    Empty,
    /// Device was never opened
    Unavailable,
    /// Read failed this cycle (already logged)
    Failed(String),
}

impl<T> Sample<T> {
    pub fn is_value(&self) -> bool {
        matches!(self, Sample::Value(_))
    }

    /// Borrow the reading, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Sample::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Optional, exclusively owned connection to one device
#[derive(Debug)]
pub struct DeviceHandle<T> {
    name: &'static str,
    device: Option<T>,
}

impl<T> DeviceHandle<T> {
    /// Open a device, converting any error into an absent handle
    pub fn open<F>(name: &'static str, open: F) -> Self
    where
        F: FnOnce() -> Result<T>,
    {
        match open() {
            Ok(device) => {
                log::info!("{}: connected", name);
                Self::present(name, device)
            }
            Err(e) => {
                log::warn!("{}: failed to open: {}", name, e);
                Self::absent(name)
            }
        }
    }

    /// Wrap an already opened device
    pub fn present(name: &'static str, device: T) -> Self {
        Self {
            name,
            device: Some(device),
        }
    }

    pub fn absent(name: &'static str) -> Self {
        Self { name, device: None }
    }

    pub fn is_present(&self) -> bool {
        self.device.is_some()
    }

    /// Attempt one read and degrade any failure to a [`Sample`]
    ///
    /// `Ok(None)` from the closure means "present, nothing to report".
    /// Absent handles return [`Sample::Unavailable`] without calling `read`.
    pub fn poll<V, F>(&mut self, read: F) -> Sample<V>
    where
        F: FnOnce(&mut T) -> Result<Option<V>>,
    {
        let Some(device) = self.device.as_mut() else {
            return Sample::Unavailable;
        };

        match read(device) {
            Ok(Some(value)) => Sample::Value(value),
            Ok(None) => Sample::Empty,
            Err(e) => {
                log::warn!("{}: read error: {}", self.name, e);
                Sample::Failed(e.to_string())
            }
        }
    }

    /// Run `f` against the device if present
    pub fn with<R, F>(&mut self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.device.as_mut().map(f)
    }

    /// Take the device out of the handle; later calls return `None`
    pub fn release(&mut self) -> Option<T> {
        self.device.take()
    }
}
