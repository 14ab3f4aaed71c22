//! Temperature readings and per-tick snapshots.

use serde::{Deserialize, Serialize};

use crate::sensor::{SensorId, SensorRole};
use crate::time::Timestamp;

/// A single read attempt of one sensor. `value` is `None` when the sensor
/// faulted or was excluded; faults never surface as errors on this path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    /// Sensor the reading came from.
    pub sensor_id: SensorId,
    /// Temperature in °C, or `None` on fault.
    pub value: Option<f64>,
    /// When the read was attempted.
    pub taken_at: Timestamp,
}

/// A persisted reading. Only present values are stored; faults are visible
/// in the live status surface but never written to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    /// Sensor the reading came from.
    pub sensor_id: SensorId,
    /// Temperature in °C.
    pub temperature: f64,
    /// When the read happened.
    pub timestamp: Timestamp,
}

/// One sensor's contribution to a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    /// Measurement the sensor provides.
    pub role: SensorRole,
    /// The read attempt.
    pub reading: TemperatureReading,
}

/// Immutable picture of all sensors at one instant, produced once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSnapshot {
    taken_at: Timestamp,
    entries: Vec<SnapshotEntry>,
}

impl TemperatureSnapshot {
    /// Build a snapshot from per-sensor entries.
    #[must_use]
    pub fn new(taken_at: Timestamp, entries: Vec<SnapshotEntry>) -> Self {
        Self { taken_at, entries }
    }

    /// When the snapshot was taken.
    #[must_use]
    pub fn taken_at(&self) -> Timestamp {
        self.taken_at
    }

    /// All entries, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// First present value for the given role, if any sensor provided one.
    #[must_use]
    pub fn value_for(&self, role: SensorRole) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| e.role == role)
            .find_map(|e| e.reading.value)
    }

    /// Boiler temperature.
    #[must_use]
    pub fn boiler(&self) -> Option<f64> {
        self.value_for(SensorRole::Boiler)
    }

    /// Flue-gas temperature.
    #[must_use]
    pub fn chimney(&self) -> Option<f64> {
        self.value_for(SensorRole::Chimney)
    }

    /// Accumulator bottom-probe temperature.
    #[must_use]
    pub fn accumulator_bottom(&self) -> Option<f64> {
        self.value_for(SensorRole::AccumulatorBottom)
    }

    /// Accumulator top-probe temperature.
    #[must_use]
    pub fn accumulator_top(&self) -> Option<f64> {
        self.value_for(SensorRole::AccumulatorTop)
    }

    /// The hotter of the two accumulator probes; `None` when both are absent.
    #[must_use]
    pub fn accumulator_max(&self) -> Option<f64> {
        match (self.accumulator_bottom(), self.accumulator_top()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(t), None) | (None, Some(t)) => Some(t),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    fn entry(role: SensorRole, id: &str, value: Option<f64>) -> SnapshotEntry {
        SnapshotEntry {
            role,
            reading: TemperatureReading {
                sensor_id: SensorId::new(id).unwrap(),
                value,
                taken_at: now(),
            },
        }
    }

    #[test]
    fn should_expose_values_by_role() {
        let snapshot = TemperatureSnapshot::new(
            now(),
            vec![
                entry(SensorRole::Boiler, "ds18b20_boiler", Some(72.0)),
                entry(SensorRole::Chimney, "max31855_chimney", Some(160.0)),
            ],
        );
        assert_eq!(snapshot.boiler(), Some(72.0));
        assert_eq!(snapshot.chimney(), Some(160.0));
        assert_eq!(snapshot.accumulator_bottom(), None);
    }

    #[test]
    fn should_return_none_for_faulted_sensor() {
        let snapshot = TemperatureSnapshot::new(
            now(),
            vec![entry(SensorRole::Boiler, "ds18b20_boiler", None)],
        );
        assert_eq!(snapshot.boiler(), None);
    }

    #[test]
    fn should_take_max_of_both_accumulator_probes() {
        let snapshot = TemperatureSnapshot::new(
            now(),
            vec![
                entry(SensorRole::AccumulatorBottom, "ds18b20_acc_bottom", Some(68.0)),
                entry(SensorRole::AccumulatorTop, "ds18b20_acc_top", Some(70.5)),
            ],
        );
        assert_eq!(snapshot.accumulator_max(), Some(70.5));
    }

    #[test]
    fn should_fall_back_to_single_accumulator_probe() {
        let snapshot = TemperatureSnapshot::new(
            now(),
            vec![entry(
                SensorRole::AccumulatorBottom,
                "ds18b20_acc_bottom",
                Some(68.0),
            )],
        );
        assert_eq!(snapshot.accumulator_max(), Some(68.0));
    }

    #[test]
    fn should_report_no_accumulator_when_both_absent() {
        let snapshot = TemperatureSnapshot::new(now(), vec![]);
        assert_eq!(snapshot.accumulator_max(), None);
    }
}
