//! `SQLite` implementation of [`SettingsRepository`].
//!
//! Documents are stored as JSON text; decoding merges partial documents over
//! the defaults.

use std::future::Future;

use sqlx::SqlitePool;

use relayhub_app::ports::SettingsRepository;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::settings::UserSettings;

use crate::error::StorageError;

const SELECT: &str = "SELECT data FROM settings WHERE user_id = ?";
const UPSERT: &str = "INSERT INTO settings (user_id, data) VALUES (?, ?) \
     ON CONFLICT(user_id) DO UPDATE SET data = excluded.data";

/// `SQLite`-backed settings repository.
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SettingsRepository for SqliteSettingsRepository {
    fn get(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserSettings>, RelayHubError>> + Send {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        async move {
            let row: Option<(String,)> = sqlx::query_as(SELECT)
                .bind(&user_id)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            let Some((data,)) = row else {
                return Ok(None);
            };
            let settings = serde_json::from_str(&data)
                .map_err(|source| StorageError::CorruptSettings { user_id, source })?;
            Ok(Some(settings))
        }
    }

    fn put(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let data = serde_json::to_string(settings);
        async move {
            let data = data.map_err(|source| StorageError::CorruptSettings {
                user_id: user_id.clone(),
                source,
            })?;
            sqlx::query(UPSERT)
                .bind(&user_id)
                .bind(data)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
