//! api.weather.gov client: points metadata, station feeds and latest observations.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use crate::{
    error::WeatherError,
    model::{RawObservation, StationId},
    provider::truncate_body,
    units,
};

use super::{ObservationSource, StationResolver};

const GEO_JSON: &str = "application/geo+json";

#[derive(Debug, Clone)]
pub struct NwsClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PointResponse {
    properties: PointProperties,
}

#[derive(Debug, Deserialize)]
struct PointProperties {
    #[serde(rename = "observationStations")]
    observation_stations: String,
}

#[derive(Debug, Deserialize)]
struct StationsResponse {
    #[serde(default)]
    features: Vec<StationFeature>,
}

#[derive(Debug, Deserialize)]
struct StationFeature {
    properties: StationProperties,
}

#[derive(Debug, Deserialize)]
struct StationProperties {
    #[serde(rename = "stationIdentifier")]
    station_identifier: String,
}

#[derive(Debug, Deserialize)]
struct ObservationResponse {
    properties: ObservationProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationProperties {
    #[serde(default)]
    temperature: Option<Measurement>,
    #[serde(default)]
    relative_humidity: Option<Measurement>,
    #[serde(default)]
    wind_speed: Option<Measurement>,
    #[serde(default)]
    text_description: Option<String>,
}

/// A `{ "unitCode": ..., "value": ... }` pair; `value` is null when the sensor had no reading.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Measurement {
    #[serde(default)]
    unit_code: Option<String>,
    value: Option<f64>,
}

impl Measurement {
    fn unit(&self) -> &str {
        self.unit_code.as_deref().unwrap_or_default()
    }
}

impl ObservationProperties {
    fn into_raw(self) -> RawObservation {
        let temperature_c = self.temperature.and_then(|m| {
            let value = m.value?;
            Some(match m.unit() {
                "wmoUnit:degF" => units::fahrenheit_to_celsius(value),
                _ => value,
            })
        });

        let wind_speed_mps = self.wind_speed.and_then(|m| {
            let value = m.value?;
            Some(match m.unit() {
                "wmoUnit:km_h-1" => units::kmh_to_mps(value),
                _ => value,
            })
        });

        RawObservation {
            temperature_c,
            humidity_pct: self.relative_humidity.and_then(|m| m.value),
            wind_speed_mps,
            description: self.text_description.filter(|d| !d.trim().is_empty()),
        }
    }
}

impl NwsClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let res = self
            .http
            .get(url)
            .header(ACCEPT, GEO_JSON)
            .send()
            .await
            .with_context(|| format!("Failed to send {what} request to weather service"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read weather service {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Weather service {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse weather service {what} JSON"))
    }

    /// URL of the observation-stations feed covering a coordinate.
    async fn stations_feed(&self, latitude: f64, longitude: f64) -> Result<String> {
        let url = format!("{}/points/{:.4},{:.4}", self.base_url, latitude, longitude);
        let point: PointResponse = self.get_json(&url, "points").await?;
        Ok(point.properties.observation_stations)
    }
}

#[async_trait]
impl StationResolver for NwsClient {
    #[instrument(skip(self), level = "debug")]
    async fn nearest_station(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<StationId, WeatherError> {
        let feed = self
            .stations_feed(latitude, longitude)
            .await
            .map_err(|e| WeatherError::StationLookupFailure(format!("{e:#}")))?;

        let stations: StationsResponse = self
            .get_json(&feed, "stations")
            .await
            .map_err(|e| WeatherError::StationLookupFailure(format!("{e:#}")))?;

        let station = stations
            .features
            .into_iter()
            .next()
            .map(|f| StationId(f.properties.station_identifier))
            .ok_or_else(|| {
                WeatherError::StationNotFound(format!("{latitude:.4},{longitude:.4}"))
            })?;

        tracing::debug!(%station, "Resolved nearest station");
        Ok(station)
    }
}

#[async_trait]
impl ObservationSource for NwsClient {
    #[instrument(skip(self, station), fields(station = %station), level = "debug")]
    async fn latest_observation(
        &self,
        station: &StationId,
    ) -> Result<RawObservation, WeatherError> {
        let url = format!("{}/stations/{}/observations/latest", self.base_url, station);

        let observation: ObservationResponse = self
            .get_json(&url, "observation")
            .await
            .map_err(|e| WeatherError::ObservationFetchFailure(format!("{e:#}")))?;

        Ok(observation.properties.into_raw())
    }
}
