//! Opening the relayhub database and applying the embedded schema.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::StorageError;

/// Used when neither the config file nor the environment names a database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:relayhub.db?mode=rwc";

/// The scheduler, the sensor watcher and HTTP handlers share the pool.
const MAX_CONNECTIONS: u32 = 4;

/// Relay writes from a tick may briefly contend with an HTTP write.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the relay, sensor, timer and settings tables live.
pub struct Config {
    /// e.g. `sqlite:relayhub.db`, or `sqlite::memory:` for a throwaway store.
    pub database_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl Config {
    fn is_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Open the database (creating the file when needed) and migrate it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is malformed, the database cannot
    /// be opened, or a migration fails.
    pub async fn build(self) -> Result<Database, StorageError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        // An in-memory database lives and dies with its connection, so the
        // pool must keep exactly one open for the whole process.
        let pool = if self.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await?
        };

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(database_url = %self.database_url, "relayhub schema up to date");

        Ok(Database { pool })
    }
}

/// Migrated pool shared by the four repositories.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
