use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::Text;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

use weather_core::{
    Config, HistoryStore, SqliteHistoryStore, WeatherLookup, WeatherRecord,
    http::{AppState, create_router},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Current weather lookups with history")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API (and the browser client, if configured).
    Serve {
        /// Listen address, e.g. 0.0.0.0:3000.
        #[arg(long)]
        bind: Option<String>,

        /// Keep history in memory only.
        #[arg(long)]
        ephemeral: bool,
    },

    /// Look up current weather for a city and record it in history.
    Lookup {
        /// City name, e.g. "Chicago".
        city: String,
    },

    /// Show the most recent lookups.
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Interactively write the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };
        let config = Config::load_from(&config_path)?;

        match self.command {
            // Writes what is in the file, without environment overrides.
            Command::Configure => configure(config, &config_path),
            Command::Serve { bind, ephemeral } => {
                let mut config = with_env(config)?;
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                serve(config, ephemeral).await
            }
            Command::Lookup { city } => {
                let config = with_env(config)?;
                let lookup = WeatherLookup::from_config(&config, open_store(&config)?)?;
                let record = lookup.lookup(&city).await?;
                print_record(&record);
                Ok(())
            }
            Command::History { limit } => {
                let config = with_env(config)?;
                let entries = open_store(&config)?.recent(limit).await?;
                if entries.is_empty() {
                    println!("No search history yet");
                }
                for entry in entries {
                    println!(
                        "{:<24} {:>4}°F  {}",
                        entry.city,
                        entry.temperature,
                        entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
                    );
                }
                Ok(())
            }
        }
    }
}

fn with_env(mut config: Config) -> Result<Config> {
    config.apply_env()?;
    Ok(config)
}

fn open_store(config: &Config) -> Result<Arc<dyn HistoryStore>> {
    let path = config.database_path()?;
    let store = SqliteHistoryStore::open(&path)
        .with_context(|| format!("Failed to open history database: {}", path.display()))?;
    info!("History database: {}", path.display());
    Ok(Arc::new(store))
}

async fn serve(config: Config, ephemeral: bool) -> Result<()> {
    let store: Arc<dyn HistoryStore> = if ephemeral {
        info!("Using in-memory history");
        Arc::new(SqliteHistoryStore::in_memory()?)
    } else {
        open_store(&config)?
    };

    match store.ping().await {
        Ok(()) => info!("History store connected"),
        Err(e) => tracing::error!("History store check failed: {e}"),
    }

    let lookup = WeatherLookup::from_config(&config, Arc::clone(&store))?;
    let app = create_router(AppState::new(lookup), config.server.static_dir.as_deref());

    if let Some(dir) = &config.server.static_dir {
        info!("Serving static files from {}", dir.display());
    }

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    drop(store);
    info!("History store closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn configure(mut config: Config, path: &std::path::Path) -> Result<()> {
    config.server.bind = Text::new("Listen address:")
        .with_default(&config.server.bind)
        .prompt()
        .context("Configuration cancelled")?;

    config.http.user_agent = Text::new("User-Agent for outbound requests (include a contact):")
        .with_default(&config.http.user_agent)
        .prompt()
        .context("Configuration cancelled")?;

    let default_db = config.database_path()?.display().to_string();
    let db = Text::new("History database file:")
        .with_default(&default_db)
        .prompt()
        .context("Configuration cancelled")?;
    config.database.path = Some(PathBuf::from(db));

    let static_dir = Text::new("Static frontend directory (empty for none):")
        .with_default(
            &config
                .server
                .static_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        )
        .prompt()
        .context("Configuration cancelled")?;
    config.server.static_dir =
        Some(static_dir.trim()).filter(|d| !d.is_empty()).map(PathBuf::from);

    config.bind_addr()?;
    config.save_to(path)?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn print_record(record: &WeatherRecord) {
    println!("{}", record.city);
    println!("  Temperature: {}°F", record.temperature);
    println!("  Conditions:  {}", record.description);
    match record.humidity {
        Some(h) => println!("  Humidity:    {h}%"),
        None => println!("  Humidity:    n/a"),
    }
    match &record.wind_speed {
        Some(w) => println!("  Wind speed:  {w} mph"),
        None => println!("  Wind speed:  n/a"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "weather-server",
            "--config",
            "/tmp/w.toml",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--ephemeral",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/w.toml")));
        match cli.command {
            Command::Serve { bind, ephemeral } => {
                assert_eq!(bind.as_deref(), Some("0.0.0.0:8080"));
                assert!(ephemeral);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn history_limit_defaults_to_ten() {
        let cli = Cli::try_parse_from(["weather-server", "history"]).unwrap();
        assert!(matches!(cli.command, Command::History { limit: 10 }));
    }

    #[test]
    fn lookup_requires_city() {
        assert!(Cli::try_parse_from(["weather-server", "lookup"]).is_err());
    }
}
