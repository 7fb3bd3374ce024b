//! # relayhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RelayStore`: stored relay levels
//!   - `SensorSource`: latest sensor snapshot
//!   - `TimerRepository`: one timer record per device
//!   - `SettingsRepository`: per-user preference documents
//!   - `LanguageModel`: the local model proxy
//! - Define **driving/inbound ports** as use-case structs:
//!   - `RelayService`, `StatusService`, `SettingsService`
//!   - `TimerScheduler`: sets, cancels and fires timers
//!   - `CommandInterpreter`: executes recognised commands
//!   - `Assistant`: commands first, language model fallback
//!   - `SensorWatcher`: motion lighting and fire alerts
//! - Provide the periodic background task runner
//!
//! ## Dependency rule
//! Depends on `relayhub-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod background;
pub mod ports;
pub mod services;

#[cfg(test)]
mod fakes;
