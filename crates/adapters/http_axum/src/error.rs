//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use heatwatch_domain::error::HeatwatchError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`HeatwatchError`] to an HTTP response with appropriate status code.
pub struct ApiError(HeatwatchError);

impl From<HeatwatchError> for ApiError {
    fn from(err: HeatwatchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HeatwatchError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            HeatwatchError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            HeatwatchError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
