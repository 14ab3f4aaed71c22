//! Outward-facing status snapshot types.
//!
//! The control loop publishes one immutable [`SystemStatus`] per tick; the
//! monitoring API serves whatever snapshot is current. Nothing here is a
//! command surface.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::control::SwitchReason;
use crate::outlet::OutletState;
use crate::sensor::SensorStatus;
use crate::time::Timestamp;

/// Aggregate phase of the heating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPhase {
    /// Rising-temperature trend: the boiler was just lit.
    Startup,
    /// Normal operation.
    Running,
    /// Chimney below its low threshold; the fire is dying down.
    CoolingDown,
}

impl fmt::Display for SystemPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => f.write_str("startup"),
            Self::Running => f.write_str("running"),
            Self::CoolingDown => f.write_str("cooling_down"),
        }
    }
}

/// Outlet portion of the status surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletStatus {
    /// Controller state (mode, reported power, connection health).
    #[serde(flatten)]
    pub state: OutletState,
    /// Reason for the most recent switch, if any happened yet.
    pub last_reason: Option<SwitchReason>,
}

/// Immutable per-tick snapshot of the whole system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Aggregate phase.
    pub phase: SystemPhase,
    /// Boiler temperature, if available this tick.
    pub boiler_temp: Option<f64>,
    /// Accumulator bottom-probe temperature.
    pub accumulator_bottom_temp: Option<f64>,
    /// Accumulator top-probe temperature.
    pub accumulator_top_temp: Option<f64>,
    /// Flue-gas temperature.
    pub chimney_temp: Option<f64>,
    /// Per-sensor detail.
    pub sensors: Vec<SensorStatus>,
    /// Outlet detail; `None` when no outlet is configured (advisory-only
    /// mode — distinct from an outlet in `Unavailable` mode).
    pub outlet: Option<OutletStatus>,
    /// When this snapshot was produced.
    pub updated_at: Timestamp,
}

impl SystemStatus {
    /// Placeholder published before the first tick completes.
    #[must_use]
    pub fn empty(updated_at: Timestamp) -> Self {
        Self {
            phase: SystemPhase::Running,
            boiler_temp: None,
            accumulator_bottom_temp: None,
            accumulator_top_temp: None,
            chimney_temp: None,
            sensors: Vec::new(),
            outlet: None,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outlet::OutletMode;
    use crate::time::now;

    #[test]
    fn should_display_phase_as_snake_case() {
        assert_eq!(SystemPhase::CoolingDown.to_string(), "cooling_down");
        assert_eq!(SystemPhase::Startup.to_string(), "startup");
    }

    #[test]
    fn should_flatten_outlet_state_into_status_json() {
        let status = OutletStatus {
            state: OutletState::new(OutletMode::Live, Some(true), true, None),
            last_reason: Some(SwitchReason::BoilerCritical),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["mode"], "live");
        assert_eq!(json["reported_on"], true);
        assert_eq!(json["last_reason"], "boiler_critical");
    }

    #[test]
    fn should_start_with_no_sensors_and_no_outlet() {
        let status = SystemStatus::empty(now());
        assert!(status.sensors.is_empty());
        assert!(status.outlet.is_none());
    }
}
