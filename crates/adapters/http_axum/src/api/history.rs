//! JSON REST handlers for persisted history.

use axum::Json;
use axum::extract::{Query, State};
use chrono::Duration;
use serde::Deserialize;

use heatwatch_app::ports::ReadingStore;
use heatwatch_domain::error::HeatwatchError;
use heatwatch_domain::event::OutletEvent;
use heatwatch_domain::reading::StoredReading;
use heatwatch_domain::sensor::SensorId;
use heatwatch_domain::time::{Timestamp, now};

use crate::error::ApiError;
use crate::state::AppState;

/// Default time range: last 3 hours.
const DEFAULT_HOURS: i64 = 3;

/// Hard cap on the requested range; larger values are clamped, not refused.
const MAX_HOURS: i64 = 24;

/// Query parameters for the history endpoints.
#[derive(Deserialize)]
pub struct HistoryQuery {
    /// Restrict to one sensor (temperature history only).
    pub sensor_id: Option<String>,
    /// Range in hours back from now; clamped to `1..=24`, default 3.
    pub hours: Option<i64>,
}

fn range_start(hours: Option<i64>) -> Timestamp {
    now() - Duration::hours(hours.unwrap_or(DEFAULT_HOURS).clamp(1, MAX_HOURS))
}

/// `GET /api/history/temperatures?sensor_id=&hours=`
pub async fn temperatures<S>(
    State(state): State<AppState<S>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<StoredReading>>, ApiError>
where
    S: ReadingStore + Send + Sync + 'static,
{
    let sensor_id = params
        .sensor_id
        .as_deref()
        .map(SensorId::new)
        .transpose()
        .map_err(HeatwatchError::from)?;

    let readings = state
        .store
        .readings_since(sensor_id, range_start(params.hours))
        .await?;
    Ok(Json(readings))
}

/// `GET /api/history/events?hours=`
pub async fn events<S>(
    State(state): State<AppState<S>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<OutletEvent>>, ApiError>
where
    S: ReadingStore + Send + Sync + 'static,
{
    let events = state.store.events_since(range_start(params.hours)).await?;
    Ok(Json(events))
}
