use chrono::FixedOffset;
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, ErrorCode, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::KeyPolicy;
use crate::error::Result;
use crate::models::WeatherRecord;
use crate::store::{InsertOutcome, RecordStore, WeatherFilter};

const SELECT_COLUMNS: &str = "obs_date, obs_time, temperature, humidity, dew_point, pressure, \
     wind_direction, wind_speed, cloudiness, precipitation, visibility, weather_phenomena";

/// SQLite-backed record store.
///
/// Dates and times are stored as ISO text, decimals as their exact text
/// rendering, and the observation instant as a UTC timestamp derived from
/// the station offset.
pub struct SqliteStore {
    conn: Connection,
    offset: FixedOffset,
    key_policy: KeyPolicy,
}

impl SqliteStore {
    pub fn open(path: &Path, offset: FixedOffset, key_policy: KeyPolicy) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!("Opened weather store at {}", path.display());
        Self::with_connection(conn, offset, key_policy)
    }

    pub fn open_in_memory(offset: FixedOffset, key_policy: KeyPolicy) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, offset, key_policy)
    }

    fn with_connection(
        conn: Connection,
        offset: FixedOffset,
        key_policy: KeyPolicy,
    ) -> Result<Self> {
        init_table(&conn, key_policy)?;
        Ok(Self {
            conn,
            offset,
            key_policy,
        })
    }

    pub fn key_policy(&self) -> KeyPolicy {
        self.key_policy
    }

    /// Stored records matching the filter, ordered by date then time.
    pub fn filter(&self, filter: WeatherFilter) -> Result<Vec<WeatherRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS}
             FROM weather_observations
             WHERE (?1 = 0 OR CAST(strftime('%Y', obs_date) AS INTEGER) = ?1)
               AND (?2 = 0 OR CAST(strftime('%m', obs_date) AS INTEGER) = ?2)
             ORDER BY obs_date, obs_time, rowid"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![filter.year, filter.month], record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            "Filter year={} month={} matched {} records",
            filter.year,
            filter.month,
            records.len()
        );
        Ok(records)
    }

    /// Years present in storage, ascending
    pub fn distinct_years(&self) -> Result<Vec<i32>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT CAST(strftime('%Y', obs_date) AS INTEGER) AS year
             FROM weather_observations
             ORDER BY year",
        )?;

        let years = stmt
            .query_map([], |row| row.get::<_, i32>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(years)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM weather_observations", [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }
}

impl RecordStore for SqliteStore {
    fn insert(&mut self, record: &WeatherRecord) -> InsertOutcome {
        let result = self.conn.execute(
            "INSERT INTO weather_observations (
                obs_date, obs_time, observed_at_utc, temperature, humidity, dew_point,
                pressure, wind_direction, wind_speed, cloudiness, precipitation,
                visibility, weather_phenomena)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                record.date,
                record.time_of_day,
                record.observed_at(self.offset),
                record.temperature.to_string(),
                record.humidity,
                record.dew_point.to_string(),
                record.pressure,
                record.wind_direction,
                record.wind_speed,
                record.cloudiness,
                record.precipitation,
                record.visibility,
                record.weather_phenomena,
            ],
        );

        match result {
            Ok(_) => InsertOutcome::Inserted,
            Err(e) if is_key_violation(&e) => InsertOutcome::Conflict(e.to_string()),
            Err(e) => InsertOutcome::Failed(e.to_string()),
        }
    }
}

/// Create the observations table if missing. An existing table keeps the
/// key layout it was created with.
pub fn init_table(conn: &Connection, key_policy: KeyPolicy) -> Result<()> {
    let (id_column, key_clause) = match key_policy {
        KeyPolicy::Natural => ("", ",\n            PRIMARY KEY (obs_date, obs_time)"),
        KeyPolicy::Surrogate => ("id INTEGER PRIMARY KEY AUTOINCREMENT,", ""),
    };

    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS weather_observations (
            {id_column}
            obs_date TEXT NOT NULL,
            obs_time TEXT NOT NULL,
            observed_at_utc TEXT,
            temperature TEXT NOT NULL,
            humidity REAL NOT NULL,
            dew_point TEXT NOT NULL,
            pressure INTEGER NOT NULL,
            wind_direction TEXT NOT NULL,
            wind_speed INTEGER NOT NULL,
            cloudiness REAL,
            precipitation REAL NOT NULL,
            visibility REAL,
            weather_phenomena TEXT NOT NULL{key_clause}
        );

        CREATE INDEX IF NOT EXISTS idx_observations_date ON weather_observations(obs_date, obs_time);
        "
    ))?;

    Ok(())
}

fn is_key_violation(error: &rusqlite::Error) -> bool {
    match error {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && matches!(
                    e.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                )
        }
        _ => false,
    }
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<WeatherRecord> {
    Ok(WeatherRecord {
        date: row.get(0)?,
        time_of_day: row.get(1)?,
        temperature: decimal_column(row, 2)?,
        humidity: row.get(3)?,
        dew_point: decimal_column(row, 4)?,
        pressure: row.get(5)?,
        wind_direction: row.get(6)?,
        wind_speed: row.get(7)?,
        cloudiness: row.get(8)?,
        precipitation: row.get(9)?,
        visibility: row.get(10)?,
        weather_phenomena: row.get(11)?,
    })
}
