//! The lookup pipeline: geocode, find a station, read its latest observation,
//! convert units, record the result.

use std::sync::Arc;
use tracing::instrument;

use crate::{
    Config,
    error::WeatherError,
    history::HistoryStore,
    model::{HistoryEntry, RawObservation, WeatherRecord},
    provider::{Providers, providers_from_config},
    units,
};

/// Shown when a station reports no text description.
pub const MISSING_DESCRIPTION: &str = "n/a";

#[derive(Clone)]
pub struct WeatherLookup {
    providers: Providers,
    history: Arc<dyn HistoryStore>,
}

impl std::fmt::Debug for WeatherLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherLookup")
            .field("providers", &self.providers)
            .finish_non_exhaustive()
    }
}

impl WeatherLookup {
    pub fn new(providers: Providers, history: Arc<dyn HistoryStore>) -> Self {
        Self { providers, history }
    }

    /// Wire the configured external services to `history`.
    pub fn from_config(
        config: &Config,
        history: Arc<dyn HistoryStore>,
    ) -> Result<Self, WeatherError> {
        Ok(Self::new(providers_from_config(config)?, history))
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Current conditions for `city`. A successful lookup appends exactly one history
    /// entry; a failed one appends nothing.
    #[instrument(skip(self), level = "info")]
    pub async fn lookup(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::InputMissing);
        }

        let location = self
            .providers
            .geocoder
            .geocode(city)
            .await
            .map_err(|e| keep_kinds(e, |e| matches!(e, WeatherError::CityNotFound(_))))?;

        let label = location.city_label();

        let station = self
            .providers
            .stations
            .nearest_station(location.latitude, location.longitude)
            .await
            .map_err(|e| {
                keep_kinds(e, |e| {
                    matches!(
                        e,
                        WeatherError::StationLookupFailure(_) | WeatherError::StationNotFound(_)
                    )
                })
            })?;

        let observation = self
            .providers
            .observations
            .latest_observation(&station)
            .await
            .map_err(|e| keep_kinds(e, |e| matches!(e, WeatherError::ObservationFetchFailure(_))))?;

        let record = normalize(label, observation).ok_or_else(|| {
            WeatherError::DataUnavailable(format!("no temperature reported by {station}"))
        })?;

        self.history.append(&record.city, record.temperature).await?;

        tracing::info!(
            city = %record.city,
            %station,
            temperature = record.temperature,
            "Weather lookup succeeded"
        );
        Ok(record)
    }

    /// The most recent `limit` lookups, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, WeatherError> {
        self.history.recent(limit).await
    }
}

/// Pass through the failure kinds a stage is allowed to report; anything else is internal.
fn keep_kinds(err: WeatherError, allowed: impl Fn(&WeatherError) -> bool) -> WeatherError {
    if allowed(&err) {
        err
    } else {
        tracing::warn!("Unexpected failure kind from lookup stage: {err}");
        WeatherError::internal(err)
    }
}

/// Build the user-facing record. `None` when the station reported no temperature.
pub fn normalize(city: String, observation: RawObservation) -> Option<WeatherRecord> {
    let temperature = units::rounded_fahrenheit(observation.temperature_c?);

    Some(WeatherRecord {
        city,
        temperature,
        description: observation
            .description
            .map(|d| d.to_lowercase())
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
        humidity: observation.humidity_pct.map(units::rounded_humidity),
        wind_speed: observation.wind_speed_mps.map(units::format_mph),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        history::SqliteHistoryStore,
        model::{Location, StationId},
        provider::{Geocoder, ObservationSource, StationResolver},
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FixedGeocoder(Option<Location>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, city: &str) -> Result<Location, WeatherError> {
            self.0.clone().ok_or_else(|| WeatherError::CityNotFound(city.to_string()))
        }
    }

    #[derive(Debug)]
    enum StationOutcome {
        Found(&'static str),
        Empty,
        Broken,
        Misbehaving,
    }

    #[derive(Debug)]
    struct FixedStations {
        outcome: StationOutcome,
        calls: AtomicUsize,
    }

    impl FixedStations {
        fn new(outcome: StationOutcome) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StationResolver for FixedStations {
        async fn nearest_station(&self, lat: f64, lon: f64) -> Result<StationId, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                StationOutcome::Found(id) => Ok(StationId(id.to_string())),
                StationOutcome::Empty => Err(WeatherError::StationNotFound(format!("{lat},{lon}"))),
                StationOutcome::Broken => Err(WeatherError::StationLookupFailure("503".into())),
                StationOutcome::Misbehaving => Err(WeatherError::StoreUnavailable("??".into())),
            }
        }
    }

    #[derive(Debug)]
    struct FixedObservation(Result<RawObservation, String>);

    #[async_trait]
    impl ObservationSource for FixedObservation {
        async fn latest_observation(&self, _: &StationId) -> Result<RawObservation, WeatherError> {
            self.0.clone().map_err(WeatherError::ObservationFetchFailure)
        }
    }

    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl HistoryStore for BrokenStore {
        async fn append(&self, _: &str, _: i32) -> Result<HistoryEntry, WeatherError> {
            Err(WeatherError::store("disk full"))
        }

        async fn recent(&self, _: usize) -> Result<Vec<HistoryEntry>, WeatherError> {
            Err(WeatherError::store("disk full"))
        }

        async fn ping(&self) -> Result<(), WeatherError> {
            Err(WeatherError::store("disk full"))
        }
    }

    fn chicago() -> Location {
        Location {
            latitude: 41.8781,
            longitude: -87.6298,
            display_name: "Chicago, Cook County, Illinois, USA".into(),
        }
    }

    fn clear_day() -> RawObservation {
        RawObservation {
            temperature_c: Some(20.0),
            humidity_pct: Some(55.0),
            wind_speed_mps: Some(4.0),
            description: Some("Clear".into()),
        }
    }

    struct Harness {
        lookup: WeatherLookup,
        stations: Arc<FixedStations>,
        store: Arc<SqliteHistoryStore>,
    }

    fn harness(
        location: Option<Location>,
        stations: StationOutcome,
        observation: Result<RawObservation, String>,
    ) -> Harness {
        let stations = Arc::new(FixedStations::new(stations));
        let store = Arc::new(SqliteHistoryStore::in_memory().unwrap());
        let providers = Providers {
            geocoder: Arc::new(FixedGeocoder(location)),
            stations: stations.clone(),
            observations: Arc::new(FixedObservation(observation)),
        };

        Harness {
            lookup: WeatherLookup::new(providers, store.clone()),
            stations,
            store,
        }
    }

    #[tokio::test]
    async fn chicago_lookup_produces_record_and_history() {
        let h = harness(Some(chicago()), StationOutcome::Found("KMDW"), Ok(clear_day()));

        let record = h.lookup.lookup("Chicago").await.unwrap();

        assert_eq!(
            record,
            WeatherRecord {
                city: "Chicago".into(),
                temperature: 68,
                description: "clear".into(),
                humidity: Some(55),
                wind_speed: Some("8.9".into()),
            }
        );

        let history = h.store.recent(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].city, "Chicago");
        assert_eq!(history[0].temperature, 68);
    }

    #[tokio::test]
    async fn blank_city_is_input_missing() {
        let h = harness(Some(chicago()), StationOutcome::Found("KMDW"), Ok(clear_day()));

        let err = h.lookup.lookup("   ").await.unwrap_err();
        assert!(matches!(err, WeatherError::InputMissing));
        assert_eq!(h.stations.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_city_stops_before_station_lookup() {
        let h = harness(None, StationOutcome::Found("KMDW"), Ok(clear_day()));

        let err = h.lookup.lookup("Atlantis").await.unwrap_err();

        assert!(matches!(err, WeatherError::CityNotFound(_)));
        assert_eq!(h.stations.calls.load(Ordering::SeqCst), 0);
        assert!(h.store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn station_failures_propagate_unchanged() {
        let h = harness(Some(chicago()), StationOutcome::Empty, Ok(clear_day()));
        let err = h.lookup.lookup("Chicago").await.unwrap_err();
        assert!(matches!(err, WeatherError::StationNotFound(_)));

        let h = harness(Some(chicago()), StationOutcome::Broken, Ok(clear_day()));
        let err = h.lookup.lookup("Chicago").await.unwrap_err();
        assert!(matches!(err, WeatherError::StationLookupFailure(_)));
        assert!(h.store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unexpected_stage_error_becomes_internal() {
        let h = harness(Some(chicago()), StationOutcome::Misbehaving, Ok(clear_day()));

        let err = h.lookup.lookup("Chicago").await.unwrap_err();
        assert!(matches!(err, WeatherError::InternalLookupFailure(_)));
    }

    #[tokio::test]
    async fn observation_failure_propagates() {
        let h = harness(Some(chicago()), StationOutcome::Found("KMDW"), Err("502".into()));

        let err = h.lookup.lookup("Chicago").await.unwrap_err();
        assert!(matches!(err, WeatherError::ObservationFetchFailure(_)));
        assert!(h.store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_temperature_is_data_unavailable_and_not_recorded() {
        let observation = RawObservation {
            temperature_c: None,
            ..clear_day()
        };
        let h = harness(Some(chicago()), StationOutcome::Found("KMDW"), Ok(observation));

        let err = h.lookup.lookup("Chicago").await.unwrap_err();

        assert!(matches!(err, WeatherError::DataUnavailable(_)));
        assert!(h.store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_hides_the_record() {
        let providers = Providers {
            geocoder: Arc::new(FixedGeocoder(Some(chicago()))),
            stations: Arc::new(FixedStations::new(StationOutcome::Found("KMDW"))),
            observations: Arc::new(FixedObservation(Ok(clear_day()))),
        };
        let lookup = WeatherLookup::new(providers, Arc::new(BrokenStore));

        let err = lookup.lookup("Chicago").await.unwrap_err();
        assert!(matches!(err, WeatherError::StoreUnavailable(_)));
    }

    #[test]
    fn normalize_fills_placeholders_for_optional_fields() {
        let raw = RawObservation {
            temperature_c: Some(21.0),
            ..Default::default()
        };

        let record = normalize("Boise".into(), raw).unwrap();

        assert_eq!(record.temperature, 70);
        assert_eq!(record.description, MISSING_DESCRIPTION);
        assert_eq!(record.humidity, None);
        assert_eq!(record.wind_speed, None);
    }

    #[test]
    fn normalize_rounds_humidity_and_formats_wind() {
        let raw = RawObservation {
            temperature_c: Some(21.0),
            humidity_pct: Some(87.6),
            wind_speed_mps: Some(3.0),
            description: Some("Light Rain".into()),
        };

        let record = normalize("Seattle".into(), raw).unwrap();

        assert_eq!(record.humidity, Some(88));
        assert_eq!(record.wind_speed.as_deref(), Some("6.7"));
        assert_eq!(record.description, "light rain");
    }
}
