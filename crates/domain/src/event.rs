//! Outlet events — persisted records of switch transitions.
//!
//! Only actual transitions are recorded (a `NoOp` decision produces no
//! event), and only after the actuator command succeeded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::control::SwitchReason;
use crate::outlet::OutletAction;
use crate::time::Timestamp;

/// Unique identifier for an [`OutletEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(uuid::Uuid);

impl Default for EventId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl EventId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

/// A confirmed switch transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletEvent {
    /// Unique event id.
    pub id: EventId,
    /// Whether the outlet was switched on or off.
    pub action: OutletAction,
    /// The decision reason that caused the switch.
    pub reason: SwitchReason,
    /// When the transition was confirmed.
    pub timestamp: Timestamp,
}

impl OutletEvent {
    /// Create a new event with a fresh id.
    #[must_use]
    pub fn new(action: OutletAction, reason: SwitchReason, timestamp: Timestamp) -> Self {
        Self {
            id: EventId::new(),
            action,
            reason,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_generate_unique_ids() {
        let a = OutletEvent::new(OutletAction::On, SwitchReason::BoilerCritical, now());
        let b = OutletEvent::new(OutletAction::On, SwitchReason::BoilerCritical, now());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_roundtrip_id_through_display_and_from_str() {
        let id = EventId::new();
        let parsed: EventId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_roundtrip_event_through_serde_json() {
        let event = OutletEvent::new(OutletAction::Off, SwitchReason::SafeTemperatures, now());
        let json = serde_json::to_string(&event).unwrap();
        let parsed: OutletEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
