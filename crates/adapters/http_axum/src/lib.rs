//! # relayhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a JSON API for the assistant (`/api/chat`), the command
//!   interpreter (`/api/commands`), relays, timers, sensors and settings
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map [`RelayHubError`](relayhub_domain::error::RelayHubError) into status
//!   codes
//!
//! ## Dependency rule
//! Depends on `relayhub-app` (for port traits and services) and
//! `relayhub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
