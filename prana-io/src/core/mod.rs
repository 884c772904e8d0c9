//! Core abstractions shared by every device.
//!
//! - [`handle::DeviceHandle`]: optional ownership of one hardware connection
//! - [`handle::Sample`]: tagged outcome of a single read
//! - [`types`]: reading structs produced by the devices

pub mod handle;
pub mod types;
