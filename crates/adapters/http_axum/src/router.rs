//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use heatwatch_app::ports::ReadingStore;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the JSON API under `/api` plus a bare `/health` probe. Includes
/// a [`TraceLayer`] that logs each HTTP request/response at the `DEBUG`
/// level using the `tracing` ecosystem.
pub fn build<S>(state: AppState<S>) -> Router
where
    S: ReadingStore + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
