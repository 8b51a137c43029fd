//! HTTP handlers for the REST API.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use super::dto::{HealthResponse, HistoryResponse, WeatherQuery};
use super::error::AppError;
use super::state::AppState;
use crate::{error::WeatherError, model::WeatherRecord};

/// Number of entries returned by `GET /api/history`.
pub const HISTORY_LIMIT: usize = 10;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /api/weather?city=<name>
///
/// A missing, blank or unparseable `city` is rejected before any outbound call is made.
pub async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> HandlerResult<WeatherRecord> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!("Rejected weather query: {rejection}");
        AppError::Lookup(WeatherError::InputMissing)
    })?;

    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(AppError::Lookup(WeatherError::InputMissing))?;

    let record = state.lookup.lookup(city).await.map_err(AppError::Lookup)?;
    Ok(Json(record))
}

/// GET /api/history
///
/// The last [`HISTORY_LIMIT`] lookups, newest first.
pub async fn get_history(State(state): State<AppState>) -> HandlerResult<HistoryResponse> {
    let history = state.lookup.recent(HISTORY_LIMIT).await.map_err(AppError::History)?;
    Ok(Json(HistoryResponse { history }))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.lookup.history().ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            "error".to_string()
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database,
    })
}
