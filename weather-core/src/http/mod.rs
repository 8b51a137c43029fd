//! HTTP boundary: maps `/api/*` requests onto [`WeatherLookup`](crate::lookup::WeatherLookup)
//! and its failures onto status codes with `{ "error": ... }` bodies.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
