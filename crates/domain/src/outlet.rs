//! Outlet state — what the controller believes about the remote switch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Connection/fallback mode of the outlet controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutletMode {
    /// Device reachable; commands are physically issued.
    Live,
    /// Device unreachable, simulation permitted; a local "as-if" state is
    /// tracked and commands fabricate success.
    SimulatedOffline,
    /// Device unreachable, simulation not permitted; commands fail
    /// explicitly.
    Unavailable,
}

impl OutletMode {
    /// Whether the device is currently not being driven for real.
    #[must_use]
    pub fn is_offline(self) -> bool {
        !matches!(self, Self::Live)
    }
}

impl fmt::Display for OutletMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::SimulatedOffline => f.write_str("simulated_offline"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// A switch transition requested or performed on the outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutletAction {
    /// Power on.
    On,
    /// Power off.
    Off,
}

impl OutletAction {
    /// Stable wire/storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// The power state this action leads to.
    #[must_use]
    pub fn as_bool(self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for OutletAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the controller's view of the outlet.
///
/// In [`OutletMode::Unavailable`] the reported power state is withheld
/// (`None`), never coerced to off — collaborators must see "unavailable",
/// not a fabricated boolean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutletState {
    /// Current connection/fallback mode.
    pub mode: OutletMode,
    /// Power state as far as the controller can assert it.
    pub reported_on: Option<bool>,
    /// Whether the last transport attempt succeeded.
    pub connection_ok: bool,
    /// Time of the last state-changing call.
    pub last_update: Option<Timestamp>,
}

impl OutletState {
    /// Build a state snapshot, enforcing the `Unavailable` invariant.
    #[must_use]
    pub fn new(
        mode: OutletMode,
        reported_on: Option<bool>,
        connection_ok: bool,
        last_update: Option<Timestamp>,
    ) -> Self {
        let reported_on = match mode {
            OutletMode::Unavailable => None,
            OutletMode::Live | OutletMode::SimulatedOffline => reported_on,
        };
        Self {
            mode,
            reported_on,
            connection_ok,
            last_update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_withhold_reported_state_when_unavailable() {
        let state = OutletState::new(OutletMode::Unavailable, Some(true), false, None);
        assert_eq!(state.reported_on, None);
    }

    #[test]
    fn should_keep_reported_state_when_live() {
        let state = OutletState::new(OutletMode::Live, Some(true), true, None);
        assert_eq!(state.reported_on, Some(true));
    }

    #[test]
    fn should_keep_reported_state_when_simulated() {
        let state = OutletState::new(OutletMode::SimulatedOffline, Some(false), false, None);
        assert_eq!(state.reported_on, Some(false));
    }

    #[test]
    fn should_mark_live_as_online() {
        assert!(!OutletMode::Live.is_offline());
        assert!(OutletMode::SimulatedOffline.is_offline());
        assert!(OutletMode::Unavailable.is_offline());
    }

    #[test]
    fn should_serialize_mode_as_snake_case() {
        let json = serde_json::to_string(&OutletMode::SimulatedOffline).unwrap();
        assert_eq!(json, "\"simulated_offline\"");
    }

    #[test]
    fn should_map_action_to_bool() {
        assert!(OutletAction::On.as_bool());
        assert!(!OutletAction::Off.as_bool());
    }
}
