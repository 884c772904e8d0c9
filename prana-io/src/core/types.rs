//! Reading types and unit conversions.
//!
//! Readings are transient: they are produced by one poll, printed, and
//! dropped. Nothing here is stored or correlated across sensors.

/// MQ-9 placeholder scale: volts to an arbitrary concentration unit
pub const GAS_SCALE_PER_VOLT: f64 = 100.0;

/// AO-O2 output at the reference point (10 mV)
pub const O2_REFERENCE_VOLTS: f64 = 0.01;

/// Ambient oxygen percentage at the reference point
pub const O2_REFERENCE_PERCENT: f64 = 20.9;

/// Estimated MQ-9 concentration from its output voltage
///
/// Linear placeholder, not a calibrated ppm value. A real conversion needs
/// the Rs/R0 ratio and the datasheet curve.
pub fn gas_concentration(voltage: f64) -> f64 {
    voltage * GAS_SCALE_PER_VOLT
}

/// Oxygen percentage from the AO-O2 output voltage
///
/// Single reference-point linear model. Meaningless outside the cell's
/// linear range.
pub fn o2_percent(voltage: f64) -> f64 {
    (voltage / O2_REFERENCE_VOLTS) * O2_REFERENCE_PERCENT
}

/// Both analog channels from one poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogReading {
    pub gas_voltage: f64,
    pub gas_concentration: f64,
    pub o2_voltage: f64,
    pub o2_percent: f64,
}

impl AnalogReading {
    pub fn from_voltages(gas_voltage: f64, o2_voltage: f64) -> Self {
        Self {
            gas_voltage,
            gas_concentration: gas_concentration(gas_voltage),
            o2_voltage,
            o2_percent: o2_percent(o2_voltage),
        }
    }
}

/// SCD4x measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasReading {
    pub co2_ppm: u16,
    pub temperature_c: f32,
    pub humidity_pct: f32,
}
