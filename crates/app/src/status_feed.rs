//! In-process status feed backed by a tokio watch channel.

use tokio::sync::watch;

use heatwatch_domain::status::SystemStatus;
use heatwatch_domain::time::now;

/// Publishes one immutable [`SystemStatus`] per control tick.
///
/// Readers (the HTTP API) hold a [`watch::Receiver`] and always see the
/// latest snapshot; publishing succeeds even with no active readers.
pub struct StatusFeed {
    sender: watch::Sender<SystemStatus>,
}

impl Default for StatusFeed {
    fn default() -> Self {
        let (sender, _) = watch::channel(SystemStatus::empty(now()));
        Self { sender }
    }
}

impl StatusFeed {
    /// Create a feed holding an empty placeholder snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to snapshots. The receiver immediately sees the current
    /// one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SystemStatus> {
        self.sender.subscribe()
    }

    /// Replace the current snapshot.
    pub fn publish(&self, status: SystemStatus) {
        self.sender.send_replace(status);
    }
}

#[cfg(test)]
mod tests {
    use heatwatch_domain::status::SystemPhase;

    use super::*;

    #[test]
    fn should_hand_out_latest_snapshot() {
        let feed = StatusFeed::new();
        let rx = feed.subscribe();

        let mut status = SystemStatus::empty(now());
        status.phase = SystemPhase::Startup;
        status.boiler_temp = Some(34.0);
        feed.publish(status);

        let seen = rx.borrow();
        assert_eq!(seen.phase, SystemPhase::Startup);
        assert_eq!(seen.boiler_temp, Some(34.0));
    }

    #[test]
    fn should_publish_without_subscribers() {
        let feed = StatusFeed::new();
        feed.publish(SystemStatus::empty(now()));
    }
}
