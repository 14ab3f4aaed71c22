//! Sensor identity and status types.
//!
//! Sensors are identified by configuration-assigned string ids such as
//! `ds18b20_boiler` — stable across restarts and meaningful in logs and the
//! monitoring API. Each sensor carries a [`SensorRole`] that tells the
//! decision logic which measurement it provides.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::Timestamp;

/// Configuration-assigned identifier of a sensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    /// Wrap an identifier, rejecting empty strings.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySensorId`] for an empty id.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptySensorId);
        }
        Ok(Self(id))
    }

    /// View the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Probe technology behind a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Contact probe on a shared 1-Wire bus (DS18B20 family).
    ContactProbe,
    /// High-temperature thermocouple, one channel per instance (MAX31855).
    Thermocouple,
    /// In-process simulated probe.
    Simulated,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContactProbe => f.write_str("contact_probe"),
            Self::Thermocouple => f.write_str("thermocouple"),
            Self::Simulated => f.write_str("simulated"),
        }
    }
}

/// Which measurement a sensor contributes to the control decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorRole {
    /// Boiler body temperature.
    Boiler,
    /// Thermal accumulator, bottom probe.
    AccumulatorBottom,
    /// Thermal accumulator, top probe.
    AccumulatorTop,
    /// Flue-gas temperature.
    Chimney,
}

impl fmt::Display for SensorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boiler => f.write_str("boiler"),
            Self::AccumulatorBottom => f.write_str("accumulator_bottom"),
            Self::AccumulatorTop => f.write_str("accumulator_top"),
            Self::Chimney => f.write_str("chimney"),
        }
    }
}

/// Number of consecutive read failures after which a sensor is excluded
/// from decisions until it recovers.
pub const MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Outward-facing status of a single sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorStatus {
    /// Stable sensor id.
    pub id: SensorId,
    /// Human-readable name from configuration.
    pub name: String,
    /// Probe technology.
    pub kind: SensorKind,
    /// Measurement the sensor provides.
    pub role: SensorRole,
    /// Whether the sensor is enabled in configuration.
    pub enabled: bool,
    /// Last successfully read temperature, if any.
    pub temperature: Option<f64>,
    /// Consecutive read failures since the last good read.
    pub error_count: u32,
    /// Time of the last successful read.
    pub last_update: Option<Timestamp>,
}

impl SensorStatus {
    /// Whether the sensor currently participates in decisions.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.enabled && self.error_count < MAX_CONSECUTIVE_ERRORS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(enabled: bool, error_count: u32) -> SensorStatus {
        SensorStatus {
            id: SensorId::new("ds18b20_boiler").unwrap(),
            name: "Boiler".to_string(),
            kind: SensorKind::ContactProbe,
            role: SensorRole::Boiler,
            enabled,
            temperature: Some(61.5),
            error_count,
            last_update: None,
        }
    }

    #[test]
    fn should_reject_empty_sensor_id() {
        assert!(SensorId::new("").is_err());
    }

    #[test]
    fn should_be_available_below_error_threshold() {
        assert!(status(true, 0).is_available());
        assert!(status(true, 2).is_available());
    }

    #[test]
    fn should_be_unavailable_at_error_threshold() {
        assert!(!status(true, MAX_CONSECUTIVE_ERRORS).is_available());
    }

    #[test]
    fn should_be_unavailable_when_disabled() {
        assert!(!status(false, 0).is_available());
    }

    #[test]
    fn should_serialize_kind_as_snake_case() {
        let json = serde_json::to_string(&SensorKind::ContactProbe).unwrap();
        assert_eq!(json, "\"contact_probe\"");
    }

    #[test]
    fn should_roundtrip_role_through_serde_json() {
        let role = SensorRole::AccumulatorTop;
        let json = serde_json::to_string(&role).unwrap();
        let parsed: SensorRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, role);
    }
}
