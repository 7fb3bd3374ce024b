//! # relayhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the store port traits defined in `relayhub-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `relayhub-app` (for port traits) and `relayhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod relay_store;
pub mod sensor_source;
pub mod settings_repo;
pub mod timer_repo;

pub use pool::{Config, Database};
pub use relay_store::SqliteRelayStore;
pub use sensor_source::SqliteSensorSource;
pub use settings_repo::SqliteSettingsRepository;
pub use timer_repo::SqliteTimerRepository;
