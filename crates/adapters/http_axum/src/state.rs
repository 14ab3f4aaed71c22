//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio::sync::watch;

use heatwatch_app::ports::ReadingStore;
use heatwatch_domain::status::SystemStatus;

/// Application state shared across all axum handlers.
///
/// Generic over the store type to avoid dynamic dispatch. `Clone` is
/// implemented manually so the store itself does not need to be `Clone` —
/// only the `Arc` wrapper and the watch receiver are cloned.
pub struct AppState<S> {
    /// Latest status snapshot published by the control loop.
    pub status: watch::Receiver<SystemStatus>,
    /// History store for time-series queries.
    pub store: Arc<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            status: self.status.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ReadingStore + Send + Sync + 'static> AppState<S> {
    /// Create application state from a status subscription and a store.
    pub fn new(status: watch::Receiver<SystemStatus>, store: S) -> Self {
        Self {
            status,
            store: Arc::new(store),
        }
    }

    /// Current status snapshot, cloned out of the watch channel.
    #[must_use]
    pub fn current_status(&self) -> SystemStatus {
        self.status.borrow().clone()
    }
}
