use crate::{
    Config,
    error::WeatherError,
    model::{Location, RawObservation, StationId},
    provider::{nominatim::NominatimGeocoder, nws::NwsClient},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc};

pub mod nominatim;
pub mod nws;

/// Resolves free text to a place.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Fails only with [`WeatherError::CityNotFound`].
    async fn geocode(&self, city: &str) -> Result<Location, WeatherError>;
}

/// Finds the observation station nearest to a coordinate.
#[async_trait]
pub trait StationResolver: Send + Sync + Debug {
    async fn nearest_station(&self, latitude: f64, longitude: f64)
    -> Result<StationId, WeatherError>;
}

/// Reads the latest observation reported by a station.
#[async_trait]
pub trait ObservationSource: Send + Sync + Debug {
    async fn latest_observation(&self, station: &StationId)
    -> Result<RawObservation, WeatherError>;
}

/// The three external collaborators of a lookup.
#[derive(Debug, Clone)]
pub struct Providers {
    pub geocoder: Arc<dyn Geocoder>,
    pub stations: Arc<dyn StationResolver>,
    pub observations: Arc<dyn ObservationSource>,
}

/// Construct the Nominatim geocoder and the weather.gov client from config.
pub fn providers_from_config(config: &Config) -> Result<Providers, WeatherError> {
    let http = http_client(config)?;

    let geocoder = NominatimGeocoder::new(
        http.clone(),
        &config.geocoding.base_url,
        &config.geocoding.country_qualifier,
    );
    let nws = Arc::new(NwsClient::new(http, &config.weather_service.base_url));

    Ok(Providers {
        geocoder: Arc::new(geocoder),
        stations: nws.clone(),
        observations: nws,
    })
}

/// Shared outbound client: identifying User-Agent and a per-request timeout.
pub fn http_client(config: &Config) -> Result<Client, WeatherError> {
    Client::builder()
        .user_agent(config.http.user_agent.as_str())
        .timeout(config.http.timeout())
        .build()
        .map_err(|e| WeatherError::internal(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
