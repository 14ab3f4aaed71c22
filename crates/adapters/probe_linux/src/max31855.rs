//! MAX31855 thermocouple amplifier via the kernel IIO subsystem.

use std::path::PathBuf;

use heatwatch_app::ports::TemperatureProbe;

use crate::error::ProbeError;

/// K-type readings above this are open-circuit artifacts, not flue gas.
const MAX_TEMP: f64 = 300.0;
/// Below this the thermocouple wiring is reversed or broken.
const MIN_TEMP: f64 = -50.0;

/// One MAX31855 exposed as an IIO device.
///
/// The `max31855` kernel driver publishes the hot-junction reading as
/// `in_temp_raw` plus `in_temp_scale`; raw × scale yields millidegrees
/// Celsius. An open or shorted thermocouple makes the raw read fail or
/// produces an implausible value, both of which surface as a missing
/// reading.
pub struct Max31855Probe {
    device: PathBuf,
}

impl Max31855Probe {
    /// Probe for the given IIO device directory, e.g.
    /// `/sys/bus/iio/devices/iio:device0`.
    #[must_use]
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }

    fn read(&self) -> Result<f64, ProbeError> {
        let raw = read_number(&self.device.join("in_temp_raw"))?;
        let scale = read_number(&self.device.join("in_temp_scale"))?;
        validate(raw * scale / 1000.0)
    }
}

impl TemperatureProbe for Max31855Probe {
    fn initialize(&mut self) -> bool {
        let present = self.device.join("in_temp_raw").exists();
        if !present {
            tracing::warn!(device = %self.device.display(), "MAX31855 IIO device not found");
        }
        present
    }

    fn read_temperature(&mut self) -> Option<f64> {
        match self.read() {
            Ok(temperature) => Some(temperature),
            Err(err) => {
                tracing::warn!(device = %self.device.display(), error = %err, "MAX31855 read failed");
                None
            }
        }
    }
}

fn read_number(path: &std::path::Path) -> Result<f64, ProbeError> {
    let raw = std::fs::read_to_string(path)?;
    let trimmed = raw.trim();
    trimmed.parse().map_err(|_| ProbeError::Parse {
        value: trimmed.to_owned(),
    })
}

/// Reject readings a flue-gas thermocouple cannot plausibly produce.
fn validate(temperature: f64) -> Result<f64, ProbeError> {
    if (MIN_TEMP..=MAX_TEMP).contains(&temperature) {
        Ok(temperature)
    } else {
        Err(ProbeError::OutOfRange(temperature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_plausible_flue_gas_temperature() {
        assert_eq!(validate(186.25).unwrap(), 186.25);
    }

    #[test]
    fn should_reject_open_thermocouple_artifact() {
        // An open circuit reads near the top of the chip's range.
        assert!(matches!(validate(1023.75), Err(ProbeError::OutOfRange(_))));
    }

    #[test]
    fn should_reject_reversed_wiring() {
        assert!(matches!(validate(-120.0), Err(ProbeError::OutOfRange(_))));
    }
}
