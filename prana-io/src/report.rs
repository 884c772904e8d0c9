//! Console rendering of one poll cycle

use crate::core::handle::Sample;
use crate::core::types::{AnalogReading, GasReading};
use std::fmt;

pub const HEADER: &str = "--- Sensor Readings ---";
pub const FOOTER: &str = "------------------------";

/// Everything read during one cycle, in poll order
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub lidar: Sample<String>,
    pub optical_flow: Sample<Vec<u8>>,
    pub analog: Sample<AnalogReading>,
    pub gas: Sample<GasReading>,
}

impl CycleReport {
    /// Human-readable lines, one or more per device
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(6);

        match &self.lidar {
            Sample::Value(line) => lines.push(format!("Lidar Raw Data: {}", line)),
            Sample::Empty | Sample::Unavailable => {
                lines.push("No Lidar data available.".to_string())
            }
            Sample::Failed(e) => lines.push(format!("Lidar data reading error: {}", e)),
        }

        match &self.optical_flow {
            Sample::Value(data) => lines.push(format!("PMW3901 Data: {:?}", data)),
            Sample::Empty => lines.push("PMW3901 returned no data.".to_string()),
            Sample::Unavailable => {
                lines.push("PMW3901 not connected or SPI bus error.".to_string())
            }
            Sample::Failed(e) => lines.push(format!("PMW3901 SPI communication error: {}", e)),
        }

        match &self.analog {
            Sample::Value(r) => {
                lines.push(format!(
                    "MQ-9: {:.4} V -> ~{:.2} ppm",
                    r.gas_voltage, r.gas_concentration
                ));
                lines.push(format!(
                    "AO-O2: {:.4} V -> ~{:.2}% O₂",
                    r.o2_voltage, r.o2_percent
                ));
            }
            Sample::Empty | Sample::Unavailable => {
                lines.push("ADC not connected, skipping analog sensor readings.".to_string())
            }
            Sample::Failed(e) => lines.push(format!("ADC read error: {}", e)),
        }

        match &self.gas {
            Sample::Value(r) => lines.push(format!(
                "CO₂: {} ppm | Temp: {:.2} °C | Humidity: {:.2}%",
                r.co2_ppm, r.temperature_c, r.humidity_pct
            )),
            Sample::Empty => lines.push("SCD40 data not ready.".to_string()),
            Sample::Unavailable => lines.push("SCD40 not connected, skipping readings.".to_string()),
            Sample::Failed(e) => lines.push(format!("SCD40 read error: {}", e)),
        }

        lines
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", HEADER)?;
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        write!(f, "{}", FOOTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_unavailable() -> CycleReport {
        CycleReport {
            lidar: Sample::Unavailable,
            optical_flow: Sample::Unavailable,
            analog: Sample::Unavailable,
            gas: Sample::Unavailable,
        }
    }

    #[test]
    fn test_unavailable_lines() {
        assert_eq!(
            all_unavailable().lines(),
            vec![
                "No Lidar data available.",
                "PMW3901 not connected or SPI bus error.",
                "ADC not connected, skipping analog sensor readings.",
                "SCD40 not connected, skipping readings.",
            ]
        );
    }

    #[test]
    fn test_value_lines() {
        let report = CycleReport {
            lidar: Sample::Value("S,0.5".to_string()),
            optical_flow: Sample::Value(vec![0, 1, 255]),
            analog: Sample::Value(AnalogReading::from_voltages(1.2, 0.011)),
            gas: Sample::Value(GasReading {
                co2_ppm: 415,
                temperature_c: 21.0,
                humidity_pct: 40.5,
            }),
        };

        assert_eq!(
            report.lines(),
            vec![
                "Lidar Raw Data: S,0.5",
                "PMW3901 Data: [0, 1, 255]",
                "MQ-9: 1.2000 V -> ~120.00 ppm",
                "AO-O2: 0.0110 V -> ~22.99% O₂",
                "CO₂: 415 ppm | Temp: 21.00 °C | Humidity: 40.50%",
            ]
        );
    }

    #[test]
    fn test_not_ready_and_failures() {
        let report = CycleReport {
            lidar: Sample::Failed("I/O error: gone".to_string()),
            optical_flow: Sample::Failed("I/O error: stalled".to_string()),
            analog: Sample::Failed("I2C error: Other".to_string()),
            gas: Sample::Empty,
        };
        let lines = report.lines();
        assert_eq!(lines[0], "Lidar data reading error: I/O error: gone");
        assert_eq!(lines[1], "PMW3901 SPI communication error: I/O error: stalled");
        assert_eq!(lines[2], "ADC read error: I2C error: Other");
        assert_eq!(lines[3], "SCD40 data not ready.");
    }

    #[test]
    fn test_display_block() {
        let text = all_unavailable().to_string();
        assert!(text.starts_with("\n--- Sensor Readings ---\n"));
        assert!(text.ends_with("------------------------"));
        assert_eq!(text.lines().count(), 7);
    }
}
