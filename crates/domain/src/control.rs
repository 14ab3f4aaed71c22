//! Control thresholds and the pure decision logic.
//!
//! The decision engine is a pure function of the current sensor snapshot,
//! the trend window, the outlet's last reported state, and the clock. It
//! performs no IO; the control loop in the `app` crate feeds it and carries
//! out whatever it decides.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::reading::TemperatureSnapshot;
use crate::time::Timestamp;
use crate::trend::TrendWindow;

/// All temperature thresholds and detection parameters, in °C and seconds.
///
/// Hysteresis is asymmetric on purpose: it is *subtracted* from critical
/// thresholds (the pump arms earlier) and *added* to safe thresholds (it
/// disarms later). A symmetric band would oscillate around the critical
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlThresholds {
    /// Boiler over-temperature threshold.
    pub boiler_critical: f64,
    /// Boiler temperature considered safe for shutdown.
    pub boiler_safe: f64,
    /// Accumulator over-temperature threshold (max of both probes).
    pub accumulator_critical: f64,
    /// Accumulator temperature considered safe for shutdown.
    pub accumulator_safe: f64,
    /// Flue-gas over-temperature threshold; overrides everything else.
    pub chimney_critical: f64,
    /// Below this flue-gas temperature the fire is considered dying down.
    pub chimney_low: f64,
    /// Margin applied to critical (minus) and safe (plus) thresholds.
    pub hysteresis: f64,
    /// How far back the trend window is consulted for startup detection.
    pub startup_horizon: Duration,
    /// Minimum rise of both boiler and chimney within the horizon.
    pub startup_delta: f64,
}

impl Default for ControlThresholds {
    fn default() -> Self {
        Self {
            boiler_critical: 85.0,
            boiler_safe: 70.0,
            accumulator_critical: 80.0,
            accumulator_safe: 65.0,
            chimney_critical: 250.0,
            chimney_low: 100.0,
            hysteresis: 3.0,
            startup_horizon: Duration::from_secs(120),
            startup_delta: 5.0,
        }
    }
}

impl ControlThresholds {
    /// Check threshold sanity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a safe threshold is not below its
    /// critical pair, the hysteresis is negative, or the startup delta is
    /// not positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hysteresis < 0.0 {
            return Err(ValidationError::NegativeHysteresis(self.hysteresis));
        }
        if self.boiler_safe >= self.boiler_critical {
            return Err(ValidationError::SafeNotBelowCritical {
                name: "boiler",
                safe: self.boiler_safe,
                critical: self.boiler_critical,
            });
        }
        if self.accumulator_safe >= self.accumulator_critical {
            return Err(ValidationError::SafeNotBelowCritical {
                name: "accumulator",
                safe: self.accumulator_safe,
                critical: self.accumulator_critical,
            });
        }
        if self.chimney_low >= self.chimney_critical {
            return Err(ValidationError::SafeNotBelowCritical {
                name: "chimney",
                safe: self.chimney_low,
                critical: self.chimney_critical,
            });
        }
        if self.startup_delta <= 0.0 {
            return Err(ValidationError::NonPositive {
                field: "startup_delta",
                value: self.startup_delta,
            });
        }
        Ok(())
    }
}

/// Why the outlet was (or would be) switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchReason {
    /// Flue gas at or above critical minus hysteresis.
    ChimneyCritical,
    /// Rising-temperature trend: the boiler was just lit.
    Startup,
    /// Boiler at or above critical minus hysteresis.
    BoilerCritical,
    /// Accumulator at or above critical minus hysteresis.
    AccumulatorCritical,
    /// Everything below safe-plus-hysteresis and the chimney cooled down.
    SafeTemperatures,
}

impl SwitchReason {
    /// Stable wire/storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChimneyCritical => "chimney_critical",
            Self::Startup => "startup",
            Self::BoilerCritical => "boiler_critical",
            Self::AccumulatorCritical => "accumulator_critical",
            Self::SafeTemperatures => "safe_temperatures",
        }
    }
}

impl fmt::Display for SwitchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the control loop should do with the outlet this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    /// Issue a power-on command.
    TurnOn,
    /// Issue a power-off command.
    TurnOff,
    /// Leave the outlet alone.
    NoOp,
}

/// Outcome of one decision-engine evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlDecision {
    /// The action to take.
    pub action: DecisionAction,
    /// Why, for `TurnOn`/`TurnOff`; `None` for `NoOp`.
    pub reason: Option<SwitchReason>,
    /// When the decision was made.
    pub evaluated_at: Timestamp,
}

impl ControlDecision {
    fn turn_on(reason: SwitchReason, evaluated_at: Timestamp) -> Self {
        Self {
            action: DecisionAction::TurnOn,
            reason: Some(reason),
            evaluated_at,
        }
    }

    fn turn_off(evaluated_at: Timestamp) -> Self {
        Self {
            action: DecisionAction::TurnOff,
            reason: Some(SwitchReason::SafeTemperatures),
            evaluated_at,
        }
    }

    fn noop(evaluated_at: Timestamp) -> Self {
        Self {
            action: DecisionAction::NoOp,
            reason: None,
            evaluated_at,
        }
    }

    /// Whether this decision requires no actuator command.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.action == DecisionAction::NoOp
    }
}

/// Pure hysteresis/trend decision logic.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    thresholds: ControlThresholds,
}

impl DecisionEngine {
    /// Create an engine with the given thresholds.
    #[must_use]
    pub fn new(thresholds: ControlThresholds) -> Self {
        Self { thresholds }
    }

    /// The thresholds this engine evaluates against.
    #[must_use]
    pub fn thresholds(&self) -> &ControlThresholds {
        &self.thresholds
    }

    /// Evaluate one tick.
    ///
    /// `reported_on` is the outlet's last known power state (`None` when
    /// unknown or unavailable). Turn-on is emitted only when the outlet is
    /// not already known to be on; turn-off only when it is known to be on.
    /// This debounces redundant commands.
    #[must_use]
    pub fn decide(
        &self,
        snapshot: &TemperatureSnapshot,
        trend: &TrendWindow,
        reported_on: Option<bool>,
        now: Timestamp,
    ) -> ControlDecision {
        if let Some(reason) = self.turn_on_reason(snapshot, trend, now) {
            return if reported_on == Some(true) {
                ControlDecision::noop(now)
            } else {
                ControlDecision::turn_on(reason, now)
            };
        }

        if self.may_turn_off(snapshot) {
            return if reported_on == Some(true) {
                ControlDecision::turn_off(now)
            } else {
                ControlDecision::noop(now)
            };
        }

        ControlDecision::noop(now)
    }

    /// First matching turn-on condition, in strict priority order.
    fn turn_on_reason(
        &self,
        snapshot: &TemperatureSnapshot,
        trend: &TrendWindow,
        now: Timestamp,
    ) -> Option<SwitchReason> {
        let t = &self.thresholds;

        if let Some(chimney) = snapshot.chimney()
            && chimney >= t.chimney_critical - t.hysteresis
        {
            return Some(SwitchReason::ChimneyCritical);
        }

        if trend.is_startup(t.startup_horizon, t.startup_delta, now) {
            return Some(SwitchReason::Startup);
        }

        if let Some(boiler) = snapshot.boiler()
            && boiler >= t.boiler_critical - t.hysteresis
        {
            return Some(SwitchReason::BoilerCritical);
        }

        if let Some(acc) = snapshot.accumulator_max()
            && acc >= t.accumulator_critical - t.hysteresis
        {
            return Some(SwitchReason::AccumulatorCritical);
        }

        None
    }

    /// Whether all readings permit a shutdown. An absent reading is
    /// vacuously safe — it never blocks shutdown, and the turn-on checks
    /// above have already ruled out everything that would make a shutdown
    /// unsafe.
    fn may_turn_off(&self, snapshot: &TemperatureSnapshot) -> bool {
        let t = &self.thresholds;

        let boiler_safe = snapshot
            .boiler()
            .is_none_or(|v| v < t.boiler_safe + t.hysteresis);
        let accumulator_safe = snapshot
            .accumulator_max()
            .is_none_or(|v| v < t.accumulator_safe + t.hysteresis);
        let chimney_cooled = snapshot.chimney().is_none_or(|v| v < t.chimney_low);

        boiler_safe && accumulator_safe && chimney_cooled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{SnapshotEntry, TemperatureReading};
    use crate::sensor::{SensorId, SensorRole};
    use crate::time::now;
    use crate::trend::TrendSample;

    fn snapshot(
        boiler: Option<f64>,
        accumulator: Option<f64>,
        chimney: Option<f64>,
        at: Timestamp,
    ) -> TemperatureSnapshot {
        let entry = |role: SensorRole, id: &str, value: Option<f64>| SnapshotEntry {
            role,
            reading: TemperatureReading {
                sensor_id: SensorId::new(id).unwrap(),
                value,
                taken_at: at,
            },
        };
        TemperatureSnapshot::new(
            at,
            vec![
                entry(SensorRole::Boiler, "ds18b20_boiler", boiler),
                entry(SensorRole::AccumulatorTop, "ds18b20_acc_top", accumulator),
                entry(SensorRole::Chimney, "max31855_chimney", chimney),
            ],
        )
    }

    fn engine() -> DecisionEngine {
        DecisionEngine::new(ControlThresholds::default())
    }

    #[test]
    fn should_turn_on_when_boiler_reaches_critical_minus_hysteresis() {
        let ts = now();
        // critical 85, hysteresis 3 -> threshold 82
        let snap = snapshot(Some(82.0), Some(40.0), Some(150.0), ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), Some(false), ts);
        assert_eq!(decision.action, DecisionAction::TurnOn);
        assert_eq!(decision.reason, Some(SwitchReason::BoilerCritical));
    }

    #[test]
    fn should_turn_on_when_state_unknown() {
        let ts = now();
        let snap = snapshot(Some(87.0), None, None, ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), None, ts);
        assert_eq!(decision.action, DecisionAction::TurnOn);
    }

    #[test]
    fn should_not_reissue_turn_on_when_already_on() {
        let ts = now();
        let snap = snapshot(Some(87.0), Some(85.0), Some(260.0), ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), Some(true), ts);
        assert!(decision.is_noop());
    }

    #[test]
    fn should_prioritize_chimney_over_safe_boiler_and_accumulator() {
        let ts = now();
        // chimney_critical 250, hysteresis 3 -> threshold 247; boiler and
        // accumulator alone would call for turn-off.
        let snap = snapshot(Some(50.0), Some(40.0), Some(248.0), ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), Some(true), ts);
        assert!(decision.is_noop(), "must stay on while chimney is critical");

        let decision = engine().decide(&snap, &TrendWindow::new(), Some(false), ts);
        assert_eq!(decision.action, DecisionAction::TurnOn);
        assert_eq!(decision.reason, Some(SwitchReason::ChimneyCritical));
    }

    #[test]
    fn should_turn_on_for_accumulator_critical() {
        let ts = now();
        // accumulator critical 80, hysteresis 3 -> threshold 77
        let snap = snapshot(Some(60.0), Some(77.5), Some(150.0), ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), Some(false), ts);
        assert_eq!(decision.reason, Some(SwitchReason::AccumulatorCritical));
    }

    #[test]
    fn should_turn_on_during_startup_trend() {
        let ts = now();
        let mut trend = TrendWindow::new();
        trend.push(TrendSample {
            at: ts - chrono::Duration::seconds(90),
            boiler: Some(30.0),
            chimney: Some(100.0),
        });
        trend.push(TrendSample {
            at: ts,
            boiler: Some(36.0),
            chimney: Some(106.0),
        });
        let snap = snapshot(Some(36.0), Some(30.0), Some(106.0), ts);
        let decision = engine().decide(&snap, &trend, Some(false), ts);
        assert_eq!(decision.action, DecisionAction::TurnOn);
        assert_eq!(decision.reason, Some(SwitchReason::Startup));
    }

    #[test]
    fn should_turn_off_when_everything_safe_and_chimney_low() {
        let ts = now();
        // safe 70+3=73, accumulator 65+3=68, chimney_low 100
        let snap = snapshot(Some(55.0), Some(50.0), Some(90.0), ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), Some(true), ts);
        assert_eq!(decision.action, DecisionAction::TurnOff);
        assert_eq!(decision.reason, Some(SwitchReason::SafeTemperatures));
    }

    #[test]
    fn should_not_turn_off_while_chimney_above_low() {
        let ts = now();
        let snap = snapshot(Some(55.0), Some(50.0), Some(150.0), ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), Some(true), ts);
        assert!(decision.is_noop());
    }

    #[test]
    fn should_not_turn_off_when_outlet_already_off() {
        let ts = now();
        let snap = snapshot(Some(55.0), Some(50.0), Some(90.0), ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), Some(false), ts);
        assert!(decision.is_noop());
    }

    #[test]
    fn should_treat_missing_readings_as_safe_for_shutdown() {
        let ts = now();
        let snap = snapshot(None, None, None, ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), Some(true), ts);
        assert_eq!(decision.action, DecisionAction::TurnOff);
    }

    #[test]
    fn should_not_let_missing_sensor_trigger_turn_on() {
        let ts = now();
        let snap = snapshot(None, None, None, ts);
        let decision = engine().decide(&snap, &TrendWindow::new(), Some(false), ts);
        assert!(decision.is_noop());
    }

    #[test]
    fn should_reject_safe_threshold_at_or_above_critical() {
        let thresholds = ControlThresholds {
            boiler_safe: 85.0,
            ..ControlThresholds::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn should_reject_negative_hysteresis() {
        let thresholds = ControlThresholds {
            hysteresis: -1.0,
            ..ControlThresholds::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn should_accept_default_thresholds() {
        assert!(ControlThresholds::default().validate().is_ok());
    }
}
