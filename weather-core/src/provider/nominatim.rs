//! Forward geocoding against a Nominatim search endpoint.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{error::WeatherError, model::Location, provider::truncate_body};

use super::Geocoder;

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    base_url: String,
    country_qualifier: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client, base_url: &str, country_qualifier: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            country_qualifier: country_qualifier.to_string(),
        }
    }

    fn query_text(&self, city: &str) -> String {
        let city = city.trim();
        if self.country_qualifier.is_empty() {
            city.to_string()
        } else {
            format!("{city}, {}", self.country_qualifier)
        }
    }

    /// `Ok(None)` when the search returned no matches.
    async fn search(&self, city: &str) -> Result<Option<Location>> {
        let url = format!("{}/search", self.base_url);
        let q = self.query_text(city);

        let res = self
            .http
            .get(&url)
            .query(&[("q", q.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .context("Failed to send request to geocoding service")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).context("Failed to parse geocoding JSON")?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude: f64 = place
            .lat
            .parse()
            .with_context(|| format!("Invalid latitude in geocoding response: {}", place.lat))?;
        let longitude: f64 = place
            .lon
            .parse()
            .with_context(|| format!("Invalid longitude in geocoding response: {}", place.lon))?;

        Ok(Some(Location {
            latitude,
            longitude,
            display_name: place.display_name,
        }))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    /// Every failure, transport or "no match", is reported as `CityNotFound`.
    #[instrument(skip(self), level = "debug")]
    async fn geocode(&self, city: &str) -> Result<Location, WeatherError> {
        match self.search(city).await {
            Ok(Some(location)) => {
                tracing::debug!(
                    lat = location.latitude,
                    lon = location.longitude,
                    name = %location.display_name,
                    "Geocoded city"
                );
                Ok(location)
            }
            Ok(None) => {
                tracing::debug!("Geocoding returned no matches");
                Err(WeatherError::CityNotFound(city.to_string()))
            }
            Err(e) => {
                tracing::debug!("Geocoding failed: {:#}", e);
                Err(WeatherError::CityNotFound(city.to_string()))
            }
        }
    }
}
