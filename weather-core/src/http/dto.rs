//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::model::HistoryEntry;

/// Query string of `GET /api/weather`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub city: Option<String>,
}

/// Body of `GET /api/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}
