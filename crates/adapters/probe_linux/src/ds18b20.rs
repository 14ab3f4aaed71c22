//! DS18B20 contact probe via the kernel `w1_therm` driver.

use std::path::PathBuf;

use heatwatch_app::ports::TemperatureProbe;

use crate::error::ProbeError;

/// DS18B20 operating range in °C; values outside are driver artifacts.
const MIN_TEMP: f64 = -55.0;
const MAX_TEMP: f64 = 125.0;

/// One DS18B20 on the 1-Wire bus.
///
/// The `w1_therm` driver exposes each probe under
/// `/sys/bus/w1/devices/<address>/temperature` as an integer in
/// millidegrees Celsius. The driver performs the CRC check; a failed
/// conversion yields a read error here, not a bogus value.
pub struct Ds18b20Probe {
    address: String,
    path: PathBuf,
}

impl Ds18b20Probe {
    /// Probe for the given 1-Wire address (e.g. `28-0316a2795b1c`),
    /// rooted at the standard sysfs location.
    #[must_use]
    pub fn new(address: &str) -> Self {
        Self::with_sysfs_root(address, "/sys/bus/w1/devices")
    }

    /// Probe with an explicit sysfs root, for test rigs.
    #[must_use]
    pub fn with_sysfs_root(address: &str, root: &str) -> Self {
        Self {
            address: address.to_owned(),
            path: PathBuf::from(root).join(address).join("temperature"),
        }
    }

    fn read(&self) -> Result<f64, ProbeError> {
        let raw = std::fs::read_to_string(&self.path)?;
        parse_millidegrees(&raw)
    }
}

impl TemperatureProbe for Ds18b20Probe {
    fn initialize(&mut self) -> bool {
        let present = self.path.exists();
        if !present {
            tracing::warn!(address = %self.address, path = %self.path.display(), "DS18B20 not found");
        }
        present
    }

    fn read_temperature(&mut self) -> Option<f64> {
        match self.read() {
            Ok(temperature) => Some(temperature),
            Err(err) => {
                tracing::warn!(address = %self.address, error = %err, "DS18B20 read failed");
                None
            }
        }
    }
}

/// Parse the `temperature` file content (millidegrees Celsius).
fn parse_millidegrees(raw: &str) -> Result<f64, ProbeError> {
    let trimmed = raw.trim();
    let millis: i32 = trimmed.parse().map_err(|_| ProbeError::Parse {
        value: trimmed.to_owned(),
    })?;
    let temperature = f64::from(millis) / 1000.0;
    if (MIN_TEMP..=MAX_TEMP).contains(&temperature) {
        Ok(temperature)
    } else {
        Err(ProbeError::OutOfRange(temperature))
    }
}
