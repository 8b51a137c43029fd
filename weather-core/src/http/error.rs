//! HTTP error handling and response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// API error response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Failure of `GET /api/weather`
    Lookup(WeatherError),
    /// Failure of `GET /api/history`
    History(WeatherError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Lookup(err) => match err {
                WeatherError::InputMissing => StatusCode::BAD_REQUEST,
                WeatherError::CityNotFound(_) | WeatherError::StationNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                WeatherError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                WeatherError::StationLookupFailure(_)
                | WeatherError::ObservationFetchFailure(_)
                | WeatherError::StoreUnavailable(_)
                | WeatherError::InternalLookupFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::History(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the browser; internal details stay in the logs.
    pub fn message(&self) -> &'static str {
        match self {
            AppError::Lookup(err) => match err {
                WeatherError::InputMissing => "City name is required",
                WeatherError::CityNotFound(_) => "City not found",
                WeatherError::StationNotFound(_) => "No weather station found near this city",
                WeatherError::DataUnavailable(_) => {
                    "Weather data is currently unavailable for this location"
                }
                _ => "Failed to fetch weather data",
            },
            AppError::History(_) => "Failed to fetch history",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Lookup(err) | AppError::History(err) if status.is_server_error() => {
                tracing::error!(%status, "Request failed: {err}");
            }
            AppError::Lookup(err) | AppError::History(err) => {
                tracing::warn!(%status, "Request rejected: {err}");
            }
        }

        (status, Json(ApiError::new(self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(err: WeatherError) -> (StatusCode, &'static str) {
        let app = AppError::Lookup(err);
        (app.status(), app.message())
    }

    #[test]
    fn lookup_errors_map_to_statuses() {
        assert_eq!(
            lookup(WeatherError::InputMissing),
            (StatusCode::BAD_REQUEST, "City name is required")
        );
        assert_eq!(lookup(WeatherError::CityNotFound("x".into())).0, StatusCode::NOT_FOUND);
        assert_eq!(lookup(WeatherError::StationNotFound("x".into())).0, StatusCode::NOT_FOUND);
        assert_eq!(
            lookup(WeatherError::DataUnavailable("x".into())).0,
            StatusCode::SERVICE_UNAVAILABLE
        );

        for err in [
            WeatherError::StationLookupFailure("x".into()),
            WeatherError::ObservationFetchFailure("x".into()),
            WeatherError::StoreUnavailable("x".into()),
            WeatherError::InternalLookupFailure("x".into()),
        ] {
            assert_eq!(
                lookup(err),
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch weather data")
            );
        }
    }

    #[test]
    fn history_errors_are_internal() {
        let app = AppError::History(WeatherError::store("locked"));
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.message(), "Failed to fetch history");
    }

    #[test]
    fn body_has_single_error_field() {
        let json = serde_json::to_value(ApiError::new("City not found")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "City not found" }));
    }
}
