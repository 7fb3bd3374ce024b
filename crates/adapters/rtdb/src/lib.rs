//! # relayhub-adapter-rtdb
//!
//! Realtime-Database REST backend. Every store path maps to
//! `{base}/{path}.json`, read with `GET`, written with `PUT` and removed with
//! `DELETE`. An optional database secret is sent as the `auth` query
//! parameter.
//!
//! ## Dependency rule
//! Depends on `relayhub-app` (for port traits) and `relayhub-domain` (for domain types).

pub mod client;
pub mod error;
pub mod store;

pub use client::{Config, RtdbClient};
pub use error::RtdbError;
pub use store::RtdbStore;
