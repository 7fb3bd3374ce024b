//! `SQLite` implementation of [`SensorSource`].
//!
//! The table holds a single row. [`SqliteSensorSource::record`] replaces it;
//! whatever bridges the board into the database calls it.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use relayhub_app::ports::SensorSource;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::sensor::SensorSnapshot;

use crate::error::StorageError;

struct Wrapper(SensorSnapshot);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(SensorSnapshot {
            distance: row.try_get("distance")?,
            voltage: row.try_get("voltage")?,
            current: row.try_get("current")?,
            power: row.try_get("power")?,
            flame: row.try_get("flame")?,
            motion: row.try_get("motion")?,
            timestamp: row.try_get("timestamp")?,
        }))
    }
}

const SELECT: &str = "SELECT * FROM sensors WHERE id = 1";
const UPSERT: &str = "INSERT INTO sensors (id, distance, voltage, current, power, flame, motion, timestamp) \
     VALUES (1, ?, ?, ?, ?, ?, ?, ?) \
     ON CONFLICT(id) DO UPDATE SET distance = excluded.distance, voltage = excluded.voltage, \
     current = excluded.current, power = excluded.power, flame = excluded.flame, \
     motion = excluded.motion, timestamp = excluded.timestamp";

/// `SQLite`-backed sensor snapshot.
pub struct SqliteSensorSource {
    pool: SqlitePool,
}

impl SqliteSensorSource {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub async fn record(&self, snapshot: &SensorSnapshot) -> Result<(), RelayHubError> {
        sqlx::query(UPSERT)
            .bind(snapshot.distance)
            .bind(snapshot.voltage)
            .bind(snapshot.current)
            .bind(snapshot.power)
            .bind(snapshot.flame)
            .bind(snapshot.motion)
            .bind(snapshot.timestamp)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

impl SensorSource for SqliteSensorSource {
    fn snapshot(&self) -> impl Future<Output = Result<Option<SensorSnapshot>, RelayHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }
}
