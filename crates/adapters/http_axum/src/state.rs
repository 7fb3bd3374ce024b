//! Shared application state for axum handlers.

use std::sync::Arc;

use relayhub_app::ports::{
    LanguageModel, RelayStore, SensorSource, SettingsRepository, TimerRepository,
};
use relayhub_app::services::assistant::Assistant;
use relayhub_app::services::relay_service::RelayService;
use relayhub_app::services::settings_service::SettingsService;
use relayhub_app::services::status_service::StatusService;
use relayhub_app::services::timer_scheduler::TimerScheduler;

/// Application state shared across all axum handlers.
///
/// Generic over the timer repository, relay store, sensor source, settings
/// repository and language model to avoid dynamic dispatch. `Clone` is
/// implemented manually so only the `Arc` wrappers are cloned.
pub struct AppState<T, S, Z, R, M> {
    /// Commands first, language model second.
    pub assistant: Arc<Assistant<T, S, Z, M>>,
    /// The scheduler also driven by the background tick task.
    pub scheduler: Arc<TimerScheduler<T, S>>,
    pub settings: Arc<SettingsService<R>>,
}

impl<T, S, Z, R, M> Clone for AppState<T, S, Z, R, M> {
    fn clone(&self) -> Self {
        Self {
            assistant: Arc::clone(&self.assistant),
            scheduler: Arc::clone(&self.scheduler),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<T, S, Z, R, M> AppState<T, S, Z, R, M>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    /// Create the state from services already shared with background tasks.
    pub fn new(
        assistant: Arc<Assistant<T, S, Z, M>>,
        scheduler: Arc<TimerScheduler<T, S>>,
        settings: Arc<SettingsService<R>>,
    ) -> Self {
        Self {
            assistant,
            scheduler,
            settings,
        }
    }

    #[must_use]
    pub fn relays(&self) -> &RelayService<S> {
        self.assistant.interpreter().relays()
    }

    #[must_use]
    pub fn status(&self) -> &StatusService<Z> {
        self.assistant.interpreter().status()
    }
}
