//! Core library for the `weather-server` application.
//!
//! This crate defines:
//! - Configuration handling
//! - Clients for the geocoding service and the National Weather Service API
//! - The lookup pipeline and its typed failure kinds
//! - The lookup history store
//! - The HTTP API served to the browser client
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod history;
pub mod http;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod units;

pub use config::Config;
pub use error::WeatherError;
pub use history::{HistoryStore, SqliteHistoryStore};
pub use lookup::WeatherLookup;
pub use model::{HistoryEntry, Location, RawObservation, StationId, WeatherRecord};
pub use provider::{Geocoder, ObservationSource, Providers, StationResolver};
