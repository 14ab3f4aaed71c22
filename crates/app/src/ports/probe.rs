//! Temperature probe port — one physical (or simulated) sensor.

/// A single temperature source.
///
/// Probes are local, synchronous reads (sysfs files on the target
/// hardware), so the trait is deliberately blocking and object-safe: the
/// registry stores probes as `Box<dyn TemperatureProbe>`.
///
/// Probes are **fail-open**: a broken sensor returns `None` from
/// [`read_temperature`](Self::read_temperature), never an error the caller
/// has to handle. The registry turns repeated `None`s into availability
/// state; the probe itself stays stateless about failures.
pub trait TemperatureProbe: Send + Sync {
    /// Prepare the probe for reading.
    ///
    /// Returns `false` when the underlying device is absent or unusable;
    /// the registry substitutes a simulated probe in that case so the rest
    /// of the system keeps running.
    fn initialize(&mut self) -> bool;

    /// Read the current temperature in °C, or `None` on any fault.
    fn read_temperature(&mut self) -> Option<f64>;
}
