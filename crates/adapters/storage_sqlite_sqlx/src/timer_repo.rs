//! `SQLite` implementation of [`TimerRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use relayhub_app::ports::TimerRepository;
use relayhub_domain::device::Device;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::timer::{Timer, TimerAction};

use crate::error::{StorageError, decode_error};

/// Wrapper for converting database rows into domain [`Timer`].
struct Wrapper(Timer);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Timer> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let relay_key: String = row.try_get("relay_key")?;
        let end_time: i64 = row.try_get("end_time")?;
        let duration: i64 = row.try_get("duration")?;
        let action: String = row.try_get("action")?;
        let created_at: i64 = row.try_get("created_at")?;

        let relay_key: Device = relay_key.parse().map_err(decode_error)?;
        let duration = u64::try_from(duration).map_err(decode_error)?;
        let action = match action.as_str() {
            "on" => TimerAction::On,
            "off" => TimerAction::Off,
            other => {
                return Err(sqlx::Error::Decode(
                    format!("unknown timer action `{other}`").into(),
                ));
            }
        };

        Ok(Self(Timer {
            relay_key,
            end_time,
            duration,
            action,
            created_at,
        }))
    }
}

const UPSERT: &str = "INSERT INTO timers (relay_key, end_time, duration, action, created_at) \
     VALUES (?, ?, ?, ?, ?) \
     ON CONFLICT(relay_key) DO UPDATE SET end_time = excluded.end_time, \
     duration = excluded.duration, action = excluded.action, created_at = excluded.created_at";
const SELECT_BY_KEY: &str = "SELECT * FROM timers WHERE relay_key = ?";
const SELECT_ALL: &str = "SELECT * FROM timers ORDER BY relay_key";
const DELETE_BY_KEY: &str = "DELETE FROM timers WHERE relay_key = ?";
const DELETE_IF_CREATED_AT: &str = "DELETE FROM timers WHERE relay_key = ? AND created_at = ?";

/// `SQLite`-backed timer repository.
pub struct SqliteTimerRepository {
    pool: SqlitePool,
}

impl SqliteTimerRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TimerRepository for SqliteTimerRepository {
    fn put(&self, timer: Timer) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPSERT)
                .bind(timer.relay_key.relay_key())
                .bind(timer.end_time)
                .bind(i64::try_from(timer.duration).unwrap_or(i64::MAX))
                .bind(timer.action.to_string())
                .bind(timer.created_at)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn get(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<Timer>, RelayHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_KEY)
                .bind(device.relay_key())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Timer>, RelayHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn delete(&self, device: Device) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_KEY)
                .bind(device.relay_key())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }

    fn delete_if(
        &self,
        device: Device,
        created_at: i64,
    ) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_IF_CREATED_AT)
                .bind(device.relay_key())
                .bind(created_at)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteTimerRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteTimerRepository::new(db.pool().clone())
    }

    fn timer(device: Device, action: TimerAction, duration: u64) -> Timer {
        Timer {
            relay_key: device,
            end_time: 10_000 + i64::try_from(duration).unwrap() * 1000,
            duration,
            action,
            created_at: 10_000,
        }
    }

    #[tokio::test]
    async fn should_store_and_retrieve_timer() {
        let repo = setup().await;
        let t = timer(Device::Fan, TimerAction::Off, 1800);
        repo.put(t.clone()).await.unwrap();
        assert_eq!(repo.get(Device::Fan).await.unwrap(), Some(t));
        assert_eq!(repo.get(Device::Light1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_replace_timer_for_same_device() {
        let repo = setup().await;
        repo.put(timer(Device::Light1, TimerAction::Off, 5))
            .await
            .unwrap();
        repo.put(timer(Device::Light1, TimerAction::On, 1))
            .await
            .unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].action, TimerAction::On);
        assert_eq!(all[0].duration, 1);
    }

    #[tokio::test]
    async fn should_list_timers_in_relay_order() {
        let repo = setup().await;
        repo.put(timer(Device::Extra, TimerAction::On, 60))
            .await
            .unwrap();
        repo.put(timer(Device::Light2, TimerAction::Off, 60))
            .await
            .unwrap();
        let devices: Vec<Device> = repo
            .get_all()
            .await
            .unwrap()
            .iter()
            .map(Timer::device)
            .collect();
        assert_eq!(devices, vec![Device::Light2, Device::Extra]);
    }

    #[tokio::test]
    async fn should_report_whether_timer_existed_on_delete() {
        let repo = setup().await;
        repo.put(timer(Device::Fan, TimerAction::Off, 60))
            .await
            .unwrap();
        assert!(repo.delete(Device::Fan).await.unwrap());
        assert!(!repo.delete(Device::Fan).await.unwrap());
    }

    #[tokio::test]
    async fn should_leave_replaced_timer_when_deleting_by_creation_time() {
        let repo = setup().await;
        let fired = timer(Device::Fan, TimerAction::Off, 60);
        let replacement = Timer {
            created_at: 20_000,
            end_time: 80_000,
            ..fired.clone()
        };
        repo.put(replacement.clone()).await.unwrap();

        assert!(!repo.delete_if(Device::Fan, fired.created_at).await.unwrap());
        assert_eq!(repo.get(Device::Fan).await.unwrap(), Some(replacement));

        assert!(repo.delete_if(Device::Fan, 20_000).await.unwrap());
        assert_eq!(repo.get(Device::Fan).await.unwrap(), None);
    }
}
