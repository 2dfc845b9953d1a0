//! SQLite catalog and time-series store.

use crate::domain::error::ExplorerError;
use crate::domain::series::{format_date, parse_date, DateRange, Observation, Series};
use crate::ports::config_port::ConfigPort;
use crate::ports::series_port::SeriesPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use tracing::debug;

/// Rows per multi-row INSERT; 4 bound values each keeps us under SQLite's 999 limit.
pub const BATCH_SIZE: usize = 100;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ExplorerError> {
        let db_path = config.require_string("sqlite", "path")?;
        let pool_size = config.get_positive("sqlite", "pool_size", 4)? as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(ExplorerError::pool)?;

        debug!(path = %db_path, pool_size, "opened sqlite store");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, ExplorerError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(ExplorerError::pool)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, ExplorerError> {
        self.pool.get().map_err(ExplorerError::pool)
    }

    pub fn initialize_schema(&self) -> Result<(), ExplorerError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS series_catalog (
                name TEXT PRIMARY KEY,
                file_name TEXT
            );
            CREATE TABLE IF NOT EXISTS time_series_data (
                id TEXT PRIMARY KEY,
                series_name TEXT NOT NULL,
                observation_date TEXT NOT NULL,
                value REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_tsd_series_date
                ON time_series_data(series_name, observation_date);",
        )
        .map_err(ExplorerError::query)?;

        Ok(())
    }

    /// Catalog file column for `name`, if any.
    pub fn catalog_file_name(&self, name: &str) -> Result<Option<String>, ExplorerError> {
        let conn = self.conn()?;
        let file: Option<Option<String>> = conn
            .query_row(
                "SELECT file_name FROM series_catalog WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(ExplorerError::query)?;
        Ok(file.flatten())
    }
}

fn parse_stored_date(column: usize, raw: String) -> rusqlite::Result<NaiveDate> {
    // tolerate timestamps written by other tools, e.g. "2020-01-01 00:00:00"
    let day = raw.get(..10).unwrap_or(&raw);
    parse_date(day).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl SeriesPort for SqliteAdapter {
    fn fetch_series(&self, name: &str, range: &DateRange) -> Result<Series, ExplorerError> {
        if !self.series_exists(name)? {
            return Err(ExplorerError::NotFound {
                series: name.to_string(),
            });
        }

        let conn = self.conn()?;
        let start = range.start.map(format_date);
        let end = range.end.map(format_date);

        let mut stmt = conn
            .prepare(
                "SELECT observation_date, value
                 FROM time_series_data
                 WHERE series_name = ?1
                   AND (?2 IS NULL OR substr(observation_date, 1, 10) >= ?2)
                   AND (?3 IS NULL OR substr(observation_date, 1, 10) <= ?3)
                 ORDER BY observation_date ASC",
            )
            .map_err(ExplorerError::query)?;

        let rows = stmt
            .query_map(params![name, start, end], |row| {
                let date = parse_stored_date(0, row.get(0)?)?;
                Ok(Observation::new(date, row.get(1)?))
            })
            .map_err(ExplorerError::query)?;

        let mut observations = Vec::new();
        for row in rows {
            observations.push(row.map_err(ExplorerError::query)?);
        }

        Ok(Series::new(name, observations))
    }

    fn list_series(&self) -> Result<Vec<String>, ExplorerError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT name FROM series_catalog ORDER BY name")
            .map_err(ExplorerError::query)?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(ExplorerError::query)?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row.map_err(ExplorerError::query)?);
        }
        Ok(names)
    }

    fn series_exists(&self, name: &str) -> Result<bool, ExplorerError> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM series_catalog WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(ExplorerError::query)?;
        Ok(found.is_some())
    }

    fn data_range(
        &self,
        name: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ExplorerError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(observation_date), MAX(observation_date), COUNT(*)
                 FROM time_series_data WHERE series_name = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(ExplorerError::query)?;

        match result {
            (Some(min), Some(max), count) if count > 0 => {
                let min = parse_stored_date(0, min).map_err(ExplorerError::query)?;
                let max = parse_stored_date(1, max).map_err(ExplorerError::query)?;
                Ok(Some((min, max, count as usize)))
            }
            _ => Ok(None),
        }
    }

    fn store_series(
        &self,
        series: &Series,
        file_name: Option<&str>,
    ) -> Result<usize, ExplorerError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(ExplorerError::query)?;

        tx.execute(
            "INSERT OR IGNORE INTO series_catalog (name, file_name) VALUES (?1, ?2)",
            params![series.name(), file_name],
        )
        .map_err(ExplorerError::query)?;

        for chunk in series.observations().chunks(BATCH_SIZE) {
            let placeholders = vec!["(?, ?, ?, ?)"; chunk.len()].join(", ");
            let sql = format!(
                "INSERT OR REPLACE INTO time_series_data (id, series_name, observation_date, value)
                 VALUES {placeholders}"
            );

            let mut values: Vec<Value> = Vec::with_capacity(chunk.len() * 4);
            for obs in chunk {
                let date = format_date(obs.date);
                values.push(Value::Text(format!("{}_{}", series.name(), date)));
                values.push(Value::Text(series.name().to_string()));
                values.push(Value::Text(date));
                values.push(Value::Real(obs.value));
            }

            tx.execute(&sql, params_from_iter(values))
                .map_err(ExplorerError::query)?;
        }

        tx.commit().map_err(ExplorerError::query)?;
        Ok(series.len())
    }

    fn health_check(&self) -> Result<(), ExplorerError> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(ExplorerError::query)?;
        Ok(())
    }
}
