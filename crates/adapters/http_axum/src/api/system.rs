//! JSON REST handler for the aggregate system summary.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use heatwatch_app::ports::ReadingStore;
use heatwatch_domain::outlet::OutletMode;
use heatwatch_domain::status::SystemPhase;
use heatwatch_domain::time::Timestamp;

use crate::state::AppState;

/// Condensed system view for dashboards that don't need per-sensor detail.
#[derive(Debug, Serialize)]
pub struct SystemSummary {
    /// Aggregate phase.
    pub phase: SystemPhase,
    /// Number of configured sensors.
    pub sensors_total: usize,
    /// Number of sensors currently delivering readings.
    pub sensors_available: usize,
    /// Outlet mode; `None` in advisory-only deployments.
    pub outlet_mode: Option<OutletMode>,
    /// When the underlying snapshot was produced.
    pub updated_at: Timestamp,
}

/// `GET /api/system`
pub async fn get<S>(State(state): State<AppState<S>>) -> Json<SystemSummary>
where
    S: ReadingStore + Send + Sync + 'static,
{
    let status = state.current_status();
    Json(SystemSummary {
        phase: status.phase,
        sensors_total: status.sensors.len(),
        sensors_available: status.sensors.iter().filter(|s| s.is_available()).count(),
        outlet_mode: status.outlet.as_ref().map(|o| o.state.mode),
        updated_at: status.updated_at,
    })
}
