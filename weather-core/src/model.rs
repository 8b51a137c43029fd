use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geocoded place.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl Location {
    /// Short label for the place: the text before the first comma of the display name.
    ///
    /// `"Chicago, Cook County, Illinois, USA"` becomes `"Chicago"`.
    pub fn city_label(&self) -> String {
        self.display_name
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Identifier of an observation station, e.g. `KMDW`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationId(pub String);

impl StationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latest reading from a station, normalized to Celsius and metres per second.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObservation {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub description: Option<String>,
}

/// Normalized result of a successful lookup, as returned by `GET /api/weather`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub city: String,
    /// Whole degrees Fahrenheit.
    pub temperature: i32,
    pub description: String,
    pub humidity: Option<u8>,
    /// Miles per hour, one fractional digit.
    pub wind_speed: Option<String>,
}

/// One persisted lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub city: String,
    pub temperature: i32,
    pub timestamp: DateTime<Utc>,
}
