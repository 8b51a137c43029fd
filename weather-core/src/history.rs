//! Append-only log of successful lookups.
//!
//! `SqliteHistoryStore` keeps rows in a single `searches` table. The connection is
//! shared behind a mutex and every statement runs on tokio's blocking pool.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, params, types::Type};
use std::{path::Path, sync::Arc};

use crate::{error::WeatherError, model::HistoryEntry};

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Record a lookup, stamped with the server clock at write time.
    async fn append(&self, city: &str, temperature: i32) -> Result<HistoryEntry, WeatherError>;

    /// At most `limit` entries, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, WeatherError>;

    /// Check that the backing store answers queries.
    async fn ping(&self) -> Result<(), WeatherError>;
}

#[derive(Clone)]
pub struct SqliteHistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteHistoryStore").finish_non_exhaustive()
    }
}

impl SqliteHistoryStore {
    /// Open (or create) the database file and its schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WeatherError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                WeatherError::store(format!(
                    "failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        Self::with_connection(Connection::open(path)?)
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Result<Self, WeatherError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, WeatherError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS searches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city TEXT NOT NULL,
                temperature INTEGER NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_searches_timestamp ON searches(timestamp DESC);
            "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T, WeatherError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, WeatherError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&conn.lock()))
            .await
            .map_err(|e| WeatherError::store(format!("history task failed: {e}")))?
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
        let city: String = row.get(0)?;
        let temperature: i32 = row.get(1)?;
        let timestamp: String = row.get(2)?;

        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
            })?;

        Ok(HistoryEntry {
            city,
            temperature,
            timestamp,
        })
    }
}

/// Fixed-width RFC 3339 so that text order matches time order.
fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, city: &str, temperature: i32) -> Result<HistoryEntry, WeatherError> {
        let city = city.to_string();

        self.blocking(move |conn| {
            let timestamp = Utc::now();
            conn.execute(
                "INSERT INTO searches (city, temperature, timestamp) VALUES (?1, ?2, ?3)",
                params![city, temperature, encode_timestamp(timestamp)],
            )?;

            tracing::debug!(%city, temperature, "Recorded lookup");
            Ok(HistoryEntry {
                city,
                temperature,
                timestamp,
            })
        })
        .await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, WeatherError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT city, temperature, timestamp
                 FROM searches
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt.query_map(params![limit], Self::row_to_entry)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn ping(&self) -> Result<(), WeatherError> {
        self.blocking(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}
