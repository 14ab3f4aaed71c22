//! JSON REST handler for the outlet state.

use axum::Json;
use axum::extract::State;

use heatwatch_app::ports::ReadingStore;
use heatwatch_domain::error::{HeatwatchError, NotFoundError};
use heatwatch_domain::status::OutletStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/outlet`
///
/// 404 in advisory-only deployments, where no outlet is configured at all.
/// An unreachable outlet is *not* a 404; it shows up with its offline mode.
pub async fn get<S>(State(state): State<AppState<S>>) -> Result<Json<OutletStatus>, ApiError>
where
    S: ReadingStore + Send + Sync + 'static,
{
    state.current_status().outlet.map(Json).ok_or_else(|| {
        ApiError::from(HeatwatchError::NotFound(NotFoundError {
            entity: "Outlet",
            id: "pump".to_owned(),
        }))
    })
}
