//! Application state for the HTTP server.

use std::sync::Arc;

use crate::lookup::WeatherLookup;

/// Shared application state passed to all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub lookup: Arc<WeatherLookup>,
}

impl AppState {
    pub fn new(lookup: WeatherLookup) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }
}
