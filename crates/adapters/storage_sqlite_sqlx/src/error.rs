//! Errors raised by the `SQLite` store.

use relayhub_domain::error::RelayHubError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// The settings column for this user does not hold a settings document.
    #[error("settings document for user `{user_id}` is malformed: {source}")]
    CorruptSettings {
        user_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("relayhub schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for RelayHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Wrap a decoding failure so it surfaces as [`sqlx::Error::Decode`].
pub(crate) fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}
