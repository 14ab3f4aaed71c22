//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HeatwatchError`] via `#[from]` or a boxed source. Nothing in the core
//! panics or throws past its own boundary; fallible operations on the hot
//! path (sensor reads, outlet commands) return explicit `Option`/`bool`
//! outcomes instead and are not represented here.

/// Top-level error for operations that cross layer boundaries.
#[derive(Debug, thiserror::Error)]
pub enum HeatwatchError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced resource does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A storage adapter failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Violations of domain invariants, mostly raised during configuration
/// validation at startup.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A sensor id was empty.
    #[error("sensor id must not be empty")]
    EmptySensorId,

    /// A threshold that must be strictly positive was not.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A "safe" threshold was configured at or above its "critical" pair.
    #[error("{name} safe threshold ({safe}) must be below critical ({critical})")]
    SafeNotBelowCritical {
        /// Which threshold pair (e.g. `"boiler"`).
        name: &'static str,
        /// The configured safe value.
        safe: f64,
        /// The configured critical value.
        critical: f64,
    },

    /// The hysteresis margin was negative.
    #[error("hysteresis must not be negative, got {0}")]
    NegativeHysteresis(f64),
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of resource (e.g. `"Sensor"`).
    pub entity: &'static str,
    /// The identifier that missed.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Sensor",
            id: "ds18b20_boiler".to_string(),
        };
        assert_eq!(err.to_string(), "Sensor ds18b20_boiler not found");
    }

    #[test]
    fn should_convert_validation_error_into_top_level() {
        let err: HeatwatchError = ValidationError::EmptySensorId.into();
        assert!(matches!(err, HeatwatchError::Validation(_)));
    }

    #[test]
    fn should_display_safe_not_below_critical() {
        let err = ValidationError::SafeNotBelowCritical {
            name: "boiler",
            safe: 90.0,
            critical: 85.0,
        };
        assert_eq!(
            err.to_string(),
            "boiler safe threshold (90) must be below critical (85)"
        );
    }
}
