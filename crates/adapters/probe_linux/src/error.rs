//! Probe read failures, logged and folded into missing readings.

/// Why a sysfs read produced no temperature.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The sysfs file could not be read.
    #[error("sysfs read failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file content was not a number.
    #[error("unparsable sysfs value {value:?}")]
    Parse {
        /// The offending file content, trimmed.
        value: String,
    },
    /// The value parsed but is physically implausible for the probe.
    #[error("implausible temperature {0} °C")]
    OutOfRange(f64),
}
