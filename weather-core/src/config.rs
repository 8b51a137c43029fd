use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::Path, path::PathBuf, time::Duration};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_WEATHER_SERVICE_URL: &str = "https://api.weather.gov";
pub const DEFAULT_USER_AGENT: &str =
    concat!("weather-server/", env!("CARGO_PKG_VERSION"), " (weather-server@localhost)");
pub const DEFAULT_COUNTRY_QUALIFIER: &str = "USA";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Directory with the browser client, served for every non-API path.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; falls back to the platform data directory when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    /// Appended to every search to keep results inside one country.
    pub country_qualifier: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODING_URL.to_string(),
            country_qualifier: DEFAULT_COUNTRY_QUALIFIER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherServiceConfig {
    pub base_url: String,
}

impl Default for WeatherServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_SERVICE_URL.to_string(),
        }
    }
}

/// Settings shared by every outbound HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [server]
/// bind = "0.0.0.0:3000"
///
/// [database]
/// path = "/var/lib/weather/history.sqlite3"
///
/// [http]
/// user_agent = "my-weather (me@example.com)"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub geocoding: GeocodingConfig,
    pub weather_service: WeatherServiceConfig,
    pub http: HttpClientConfig,
}

impl Config {
    /// Load config from the platform config directory, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Configured database file, or `history.sqlite3` in the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("history.sqlite3")),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind))
    }

    /// Apply `WEATHER_*` (and `PORT`) overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = var("WEATHER_BIND") {
            self.server.bind = bind;
        }

        if let Some(port) = var("PORT") {
            let port: u16 =
                port.parse().with_context(|| format!("Invalid PORT value: {port}"))?;
            let host = self
                .server
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "127.0.0.1".to_string());
            self.server.bind = format!("{host}:{port}");
        }

        if let Some(path) = var("WEATHER_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(dir) = var("WEATHER_STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(dir));
        }

        if let Some(agent) = var("WEATHER_USER_AGENT") {
            self.http.user_agent = agent;
        }

        if let Some(secs) = var("WEATHER_TIMEOUT_SECS") {
            self.http.timeout_secs = secs
                .parse()
                .with_context(|| format!("Invalid WEATHER_TIMEOUT_SECS value: {secs}"))?;
        }

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-task", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}
