//! JSON REST handlers for sensor detail.

use axum::Json;
use axum::extract::{Path, State};

use heatwatch_app::ports::ReadingStore;
use heatwatch_domain::error::{HeatwatchError, NotFoundError};
use heatwatch_domain::sensor::SensorStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/sensors`
pub async fn list<S>(State(state): State<AppState<S>>) -> Json<Vec<SensorStatus>>
where
    S: ReadingStore + Send + Sync + 'static,
{
    Json(state.current_status().sensors)
}

/// `GET /api/sensor/{id}`
pub async fn get<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<SensorStatus>, ApiError>
where
    S: ReadingStore + Send + Sync + 'static,
{
    state
        .current_status()
        .sensors
        .into_iter()
        .find(|sensor| sensor.id.as_str() == id)
        .map(Json)
        .ok_or_else(|| {
            ApiError::from(HeatwatchError::NotFound(NotFoundError {
                entity: "Sensor",
                id,
            }))
        })
}
