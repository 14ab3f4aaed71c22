//! Simulated temperature probe.
//!
//! Used in two places: explicitly configured simulated sensors (development
//! rigs without hardware), and as the automatic substitute when a hardware
//! probe fails to initialize.

use std::sync::{Arc, Mutex};

use rand::Rng;

use crate::ports::TemperatureProbe;

/// Handle for changing a [`SimulatedProbe`]'s temperature after the probe
/// has been boxed into the registry.
#[derive(Debug, Clone)]
pub struct SimulatedHandle {
    level: Arc<Mutex<f64>>,
}

impl SimulatedHandle {
    /// Set the temperature the probe will report.
    pub fn set(&self, temperature: f64) {
        *self.level.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = temperature;
    }
}

/// Probe that reports a configurable base temperature, optionally with a
/// small uniform jitter so simulated charts don't draw flat lines.
#[derive(Debug)]
pub struct SimulatedProbe {
    level: Arc<Mutex<f64>>,
    jitter: f64,
}

impl SimulatedProbe {
    /// Probe reporting exactly `base` on every read.
    #[must_use]
    pub fn new(base: f64) -> Self {
        Self {
            level: Arc::new(Mutex::new(base)),
            jitter: 0.0,
        }
    }

    /// Probe reporting `base` plus a uniform offset in `[-jitter, jitter]`.
    #[must_use]
    pub fn with_jitter(base: f64, jitter: f64) -> Self {
        Self {
            level: Arc::new(Mutex::new(base)),
            jitter: jitter.abs(),
        }
    }

    /// Handle to adjust the reported temperature later.
    #[must_use]
    pub fn handle(&self) -> SimulatedHandle {
        SimulatedHandle {
            level: Arc::clone(&self.level),
        }
    }
}

impl TemperatureProbe for SimulatedProbe {
    fn initialize(&mut self) -> bool {
        true
    }

    fn read_temperature(&mut self) -> Option<f64> {
        let base = *self
            .level
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if self.jitter == 0.0 {
            Some(base)
        } else {
            Some(base + rand::thread_rng().gen_range(-self.jitter..=self.jitter))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_base_temperature_without_jitter() {
        let mut probe = SimulatedProbe::new(42.5);
        assert!(probe.initialize());
        assert_eq!(probe.read_temperature(), Some(42.5));
    }

    #[test]
    fn should_follow_handle_updates() {
        let mut probe = SimulatedProbe::new(20.0);
        let handle = probe.handle();
        handle.set(87.0);
        assert_eq!(probe.read_temperature(), Some(87.0));
    }

    #[test]
    fn should_keep_jitter_within_bounds() {
        let mut probe = SimulatedProbe::with_jitter(50.0, 2.0);
        for _ in 0..100 {
            let value = probe.read_temperature().unwrap();
            assert!((48.0..=52.0).contains(&value));
        }
    }
}
