//! Outlet transport port — one smart-plug protocol.

use std::future::Future;

/// A single request to the plug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutletRequest {
    /// Switch the relay on.
    PowerOn,
    /// Switch the relay off.
    PowerOff,
    /// Ask for the current relay state without changing it.
    PowerQuery,
}

/// What the plug answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutletReply {
    /// Relay state as reported by the device. `None` when the device
    /// answered but the reply did not state the power value (ambiguous
    /// reply — the transport must not guess).
    pub power_on: Option<bool>,
}

/// Transport-level failure.
///
/// Only [`Rejected`](Self::Rejected) is definitive: the device was reached
/// and refused the command, so retrying the same request is pointless. The
/// other variants are transient and subject to the controller's retry
/// budget.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete in time.
    #[error("outlet request timed out")]
    Timeout,
    /// The device could not be reached.
    #[error("outlet connection failed: {0}")]
    Connection(String),
    /// The device answered and refused the command.
    #[error("outlet rejected the command: {0}")]
    Rejected(String),
}

impl TransportError {
    /// Whether retrying the same request cannot help.
    #[must_use]
    pub fn is_definitive(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// One attempt per call; the controller owns retries and fallback modes.
pub trait OutletTransport: Send + Sync {
    /// Human-readable endpoint for log lines.
    fn endpoint(&self) -> &str;

    /// Execute a single request against the device.
    ///
    /// # Errors
    ///
    /// [`TransportError::Timeout`] or [`TransportError::Connection`] on
    /// transient failure, [`TransportError::Rejected`] when the device
    /// refused the command.
    fn execute(
        &self,
        request: OutletRequest,
    ) -> impl Future<Output = Result<OutletReply, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_treat_only_rejection_as_definitive() {
        assert!(TransportError::Rejected("bad arg".into()).is_definitive());
        assert!(!TransportError::Timeout.is_definitive());
        assert!(!TransportError::Connection("refused".into()).is_definitive());
    }
}
