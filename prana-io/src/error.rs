//! Error types for PranaIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// PranaIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error (also covers spidev, which reports through `std::io`)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I2C bus error
    #[error("I2C error: {0}")]
    I2c(String),

    /// Sensor reported an error or timed out
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::I2c`] from any embedded-hal I2C error
    pub fn i2c<E: embedded_hal::i2c::Error>(err: E) -> Self {
        Error::I2c(format!("{:?}", err.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

    #[test]
    fn test_i2c_error_uses_kind() {
        let err = Error::i2c(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        assert_eq!(err.to_string(), "I2C error: NoAcknowledge(Address)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "spi stalled");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: spi stalled");
    }
}
