//! JSON REST handler for the full status snapshot.

use axum::Json;
use axum::extract::State;

use heatwatch_app::ports::ReadingStore;
use heatwatch_domain::status::SystemStatus;

use crate::state::AppState;

/// `GET /api/status`
pub async fn get<S>(State(state): State<AppState<S>>) -> Json<SystemStatus>
where
    S: ReadingStore + Send + Sync + 'static,
{
    Json(state.current_status())
}
