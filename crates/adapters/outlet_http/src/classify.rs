//! Mapping of HTTP client failures onto the transport error taxonomy.

use heatwatch_app::ports::TransportError;

/// Fold a [`reqwest::Error`] into the controller's taxonomy.
///
/// Timeouts and connection problems are transient; an HTTP error status
/// means the device (or the cloud) answered and refused, which is
/// definitive.
pub(crate) fn classify(err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if let Some(status) = err.status() {
        TransportError::Rejected(format!("http status {status}"))
    } else {
        TransportError::Connection(err.to_string())
    }
}
