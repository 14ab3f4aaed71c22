//! Sensor registry — fail-open polling over a set of probes.
//!
//! The registry owns the probes, counts consecutive read failures per
//! sensor and produces one [`TemperatureSnapshot`] per control tick. A
//! sensor that keeps failing is marked unavailable (and excluded from
//! decisions by virtue of yielding no value) but is still polled, so a
//! single good read brings it back.

use heatwatch_domain::reading::{SnapshotEntry, TemperatureReading, TemperatureSnapshot};
use heatwatch_domain::sensor::{
    MAX_CONSECUTIVE_ERRORS, SensorId, SensorKind, SensorRole, SensorStatus,
};
use heatwatch_domain::time::Timestamp;

use crate::ports::TemperatureProbe;
use crate::simulated::SimulatedProbe;

/// Ambient temperature reported by substitute probes.
const SUBSTITUTE_BASE: f64 = 21.0;

/// Static description of one configured sensor.
#[derive(Debug, Clone)]
pub struct SensorDescriptor {
    /// Stable identifier (hardware address or configured name).
    pub id: SensorId,
    /// Human-readable name.
    pub name: String,
    /// Probe technology.
    pub kind: SensorKind,
    /// Measurement the sensor provides.
    pub role: SensorRole,
    /// Disabled sensors are kept in the status surface but never read.
    pub enabled: bool,
}

struct RegisteredSensor {
    descriptor: SensorDescriptor,
    probe: Box<dyn TemperatureProbe>,
    error_count: u32,
    last_value: Option<f64>,
    last_update: Option<Timestamp>,
}

/// Owns all configured sensors and their probes.
#[derive(Default)]
pub struct SensorRegistry {
    sensors: Vec<RegisteredSensor>,
}

impl SensorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sensor with its probe.
    ///
    /// When an enabled probe fails to initialize, a [`SimulatedProbe`] is
    /// substituted and the sensor's kind is rewritten to
    /// [`SensorKind::Simulated`], so the rest of the system keeps running
    /// and the substitution stays visible in the status surface.
    pub fn register(&mut self, mut descriptor: SensorDescriptor, mut probe: Box<dyn TemperatureProbe>) {
        if descriptor.enabled && !probe.initialize() {
            tracing::warn!(
                sensor = %descriptor.id,
                "probe failed to initialize, substituting a simulated probe"
            );
            descriptor.kind = SensorKind::Simulated;
            probe = Box::new(SimulatedProbe::with_jitter(SUBSTITUTE_BASE, 0.5));
        }
        self.sensors.push(RegisteredSensor {
            descriptor,
            probe,
            error_count: 0,
            last_value: None,
            last_update: None,
        });
    }

    /// Number of registered sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Whether no sensors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Poll every enabled sensor once and assemble the tick snapshot.
    ///
    /// A failed read increments the sensor's error counter; a successful
    /// read resets it, so availability self-heals on the next good read.
    pub fn snapshot(&mut self, now: Timestamp) -> TemperatureSnapshot {
        let mut entries = Vec::with_capacity(self.sensors.len());
        for sensor in &mut self.sensors {
            let value = if sensor.descriptor.enabled {
                sensor.probe.read_temperature()
            } else {
                None
            };
            match value {
                Some(temperature) => {
                    if sensor.error_count >= MAX_CONSECUTIVE_ERRORS {
                        tracing::info!(sensor = %sensor.descriptor.id, "sensor recovered");
                    }
                    sensor.error_count = 0;
                    sensor.last_value = Some(temperature);
                    sensor.last_update = Some(now);
                }
                None if sensor.descriptor.enabled => {
                    sensor.error_count = sensor.error_count.saturating_add(1);
                    if sensor.error_count == MAX_CONSECUTIVE_ERRORS {
                        tracing::warn!(
                            sensor = %sensor.descriptor.id,
                            errors = sensor.error_count,
                            "sensor marked unavailable"
                        );
                    }
                }
                None => {}
            }
            entries.push(SnapshotEntry {
                role: sensor.descriptor.role,
                reading: TemperatureReading {
                    sensor_id: sensor.descriptor.id.clone(),
                    value,
                    taken_at: now,
                },
            });
        }
        TemperatureSnapshot::new(now, entries)
    }

    /// Status of every registered sensor, in registration order.
    #[must_use]
    pub fn statuses(&self) -> Vec<SensorStatus> {
        self.sensors.iter().map(status_of).collect()
    }

    /// Status of one sensor by id.
    #[must_use]
    pub fn get(&self, id: &SensorId) -> Option<SensorStatus> {
        self.sensors
            .iter()
            .find(|s| s.descriptor.id == *id)
            .map(status_of)
    }
}

fn status_of(sensor: &RegisteredSensor) -> SensorStatus {
    SensorStatus {
        id: sensor.descriptor.id.clone(),
        name: sensor.descriptor.name.clone(),
        kind: sensor.descriptor.kind,
        role: sensor.descriptor.role,
        enabled: sensor.descriptor.enabled,
        temperature: sensor.last_value,
        error_count: sensor.error_count,
        last_update: sensor.last_update,
    }
}
