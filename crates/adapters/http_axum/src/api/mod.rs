//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod history;
#[allow(clippy::missing_errors_doc)]
pub mod outlet;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;
#[allow(clippy::missing_errors_doc)]
pub mod status;
#[allow(clippy::missing_errors_doc)]
pub mod system;

use axum::Router;
use axum::routing::get;

use heatwatch_app::ports::ReadingStore;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S>() -> Router<AppState<S>>
where
    S: ReadingStore + Send + Sync + 'static,
{
    Router::new()
        .route("/status", get(status::get::<S>))
        .route("/sensors", get(sensors::list::<S>))
        .route("/sensor/{id}", get(sensors::get::<S>))
        .route("/outlet", get(outlet::get::<S>))
        .route("/system", get(system::get::<S>))
        .route("/history/temperatures", get(history::temperatures::<S>))
        .route("/history/events", get(history::events::<S>))
}
