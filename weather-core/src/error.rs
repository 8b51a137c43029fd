//! Failure kinds of the weather lookup pipeline and the history store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("City name is required")]
    InputMissing,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Station lookup failed: {0}")]
    StationLookupFailure(String),

    #[error("No observation station found near {0}")]
    StationNotFound(String),

    #[error("Observation fetch failed: {0}")]
    ObservationFetchFailure(String),

    #[error("Weather data unavailable: {0}")]
    DataUnavailable(String),

    #[error("History store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal lookup failure: {0}")]
    InternalLookupFailure(String),
}

impl WeatherError {
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable(err.to_string())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::InternalLookupFailure(err.to_string())
    }

    /// Whether the failure means "no such place" to the caller.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CityNotFound(_) | Self::StationNotFound(_))
    }
}

impl From<rusqlite::Error> for WeatherError {
    fn from(err: rusqlite::Error) -> Self {
        Self::store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_kinds() {
        assert!(WeatherError::CityNotFound("Atlantis".into()).is_not_found());
        assert!(WeatherError::StationNotFound("Nome".into()).is_not_found());
        assert!(!WeatherError::DataUnavailable("KMDW".into()).is_not_found());
        assert!(!WeatherError::InputMissing.is_not_found());
    }

    #[test]
    fn sqlite_errors_become_store_unavailable() {
        let err: WeatherError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, WeatherError::StoreUnavailable(_)));
    }
}
