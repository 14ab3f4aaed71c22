//! Bounded trend window for startup detection.
//!
//! The window keeps the last [`TREND_CAPACITY`] samples of boiler and
//! chimney temperature. Startup ("fire just lit") is detected when both
//! probes rose by at least a configured delta within a detection horizon —
//! a rising trend on only one probe is not sufficient, since a lone rising
//! chimney can be a draft and a lone rising boiler a circulation artifact.

use std::collections::VecDeque;
use std::time::Duration;

use crate::time::Timestamp;

/// Maximum number of samples retained; oldest are evicted on overflow.
pub const TREND_CAPACITY: usize = 100;

/// One control-tick sample of the two trend-relevant temperatures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSample {
    /// When the sample was taken.
    pub at: Timestamp,
    /// Boiler temperature, if the sensor produced one.
    pub boiler: Option<f64>,
    /// Chimney temperature, if the sensor produced one.
    pub chimney: Option<f64>,
}

/// Ring buffer of [`TrendSample`]s with horizon-bounded trend queries.
#[derive(Debug, Clone, Default)]
pub struct TrendWindow {
    samples: VecDeque<TrendSample>,
}

impl TrendWindow {
    /// Create an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, evicting the oldest once the capacity is reached.
    pub fn push(&mut self, sample: TrendSample) {
        if self.samples.len() == TREND_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Detect the startup condition.
    ///
    /// True iff at least two samples fall within `horizon` of `now` and
    /// both the boiler and the chimney temperature increased by at least
    /// `delta` between the earliest and latest in-horizon sample. A missing
    /// reading at either endpoint disqualifies that probe, and with it the
    /// whole detection. Samples older than the horizon are ignored even if
    /// still physically present in the buffer.
    #[must_use]
    pub fn is_startup(&self, horizon: Duration, delta: f64, now: Timestamp) -> bool {
        let Ok(horizon) = chrono::Duration::from_std(horizon) else {
            return false;
        };
        let cutoff = now - horizon;

        let mut in_horizon = self.samples.iter().filter(|s| s.at >= cutoff);
        let Some(first) = in_horizon.next() else {
            return false;
        };
        let Some(last) = in_horizon.last() else {
            return false;
        };

        let rose = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(start), Some(end)) => end - start >= delta,
            _ => false,
        };

        rose(first.boiler, last.boiler) && rose(first.chimney, last.chimney)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    const HORIZON: Duration = Duration::from_secs(120);

    fn sample(age_secs: i64, boiler: Option<f64>, chimney: Option<f64>, at: Timestamp) -> TrendSample {
        TrendSample {
            at: at - chrono::Duration::seconds(age_secs),
            boiler,
            chimney,
        }
    }

    #[test]
    fn should_detect_startup_when_both_probes_rise() {
        let ts = now();
        let mut window = TrendWindow::new();
        window.push(sample(90, Some(30.0), Some(100.0), ts));
        window.push(sample(0, Some(36.0), Some(106.0), ts));
        assert!(window.is_startup(HORIZON, 5.0, ts));
    }

    #[test]
    fn should_not_detect_startup_when_boiler_rise_below_delta() {
        let ts = now();
        let mut window = TrendWindow::new();
        window.push(sample(90, Some(30.0), Some(100.0), ts));
        window.push(sample(0, Some(34.0), Some(106.0), ts));
        assert!(!window.is_startup(HORIZON, 5.0, ts));
    }

    #[test]
    fn should_not_detect_startup_with_single_sample() {
        let ts = now();
        let mut window = TrendWindow::new();
        window.push(sample(0, Some(36.0), Some(106.0), ts));
        assert!(!window.is_startup(HORIZON, 5.0, ts));
    }

    #[test]
    fn should_not_detect_startup_when_endpoint_reading_absent() {
        let ts = now();
        let mut window = TrendWindow::new();
        window.push(sample(90, None, Some(100.0), ts));
        window.push(sample(0, Some(36.0), Some(106.0), ts));
        assert!(!window.is_startup(HORIZON, 5.0, ts));
    }

    #[test]
    fn should_ignore_samples_outside_horizon() {
        let ts = now();
        let mut window = TrendWindow::new();
        // A huge rise, but it started before the horizon.
        window.push(sample(600, Some(20.0), Some(60.0), ts));
        window.push(sample(60, Some(40.0), Some(110.0), ts));
        window.push(sample(0, Some(41.0), Some(111.0), ts));
        assert!(!window.is_startup(HORIZON, 5.0, ts));
    }

    #[test]
    fn should_evict_oldest_sample_at_capacity() {
        let ts = now();
        let mut window = TrendWindow::new();
        for i in 0..(TREND_CAPACITY + 10) {
            window.push(sample(0, Some(i as f64), Some(i as f64), ts));
        }
        assert_eq!(window.len(), TREND_CAPACITY);
        // The first surviving sample is the 11th pushed.
        assert_eq!(window.samples.front().unwrap().boiler, Some(10.0));
    }
}
