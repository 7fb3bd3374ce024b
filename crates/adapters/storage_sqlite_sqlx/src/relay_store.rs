//! `SQLite` implementation of [`RelayStore`].

use std::future::Future;

use sqlx::SqlitePool;

use relayhub_app::ports::RelayStore;
use relayhub_domain::device::Device;
use relayhub_domain::error::RelayHubError;

use crate::error::StorageError;

const SELECT_ONE: &str = "SELECT value FROM relays WHERE key = ?";
const SELECT_ALL: &str = "SELECT key, value FROM relays";
const UPSERT: &str = "INSERT INTO relays (key, value) VALUES (?, ?) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// `SQLite`-backed relay levels.
pub struct SqliteRelayStore {
    pool: SqlitePool,
}

impl SqliteRelayStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RelayStore for SqliteRelayStore {
    fn read(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<bool>, RelayHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<(bool,)> = sqlx::query_as(SELECT_ONE)
                .bind(device.relay_key())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|(value,)| value))
        }
    }

    fn read_all(
        &self,
    ) -> impl Future<Output = Result<Vec<(Device, Option<bool>)>, RelayHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<(String, bool)> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Device::ALL
                .into_iter()
                .map(|device| {
                    let level = rows
                        .iter()
                        .find(|(key, _)| key == device.relay_key())
                        .map(|(_, value)| *value);
                    (device, level)
                })
                .collect())
        }
    }

    fn write(
        &self,
        device: Device,
        level: bool,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPSERT)
                .bind(device.relay_key())
                .bind(level)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
