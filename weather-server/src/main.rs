//! Binary crate for the `weather-server` tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Running the HTTP server or one-off lookups
//!
//! # Environment Variables
//!
//! A `.env` file in the working directory is loaded first.
//!
//! - `RUST_LOG`: log filter (default: info)
//! - `WEATHER_BIND` / `PORT`: listen address / port
//! - `WEATHER_DB_PATH`: history database file
//! - `WEATHER_STATIC_DIR`: browser client directory
//! - `WEATHER_USER_AGENT`, `WEATHER_TIMEOUT_SECS`: outbound request settings

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
