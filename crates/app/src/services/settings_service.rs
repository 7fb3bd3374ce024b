//! Settings service: read and update per-user preferences.

use relayhub_domain::error::RelayHubError;
use relayhub_domain::settings::UserSettings;

use crate::ports::SettingsRepository;

#[derive(Debug, Clone)]
pub struct SettingsService<R> {
    repo: R,
}

impl<R: SettingsRepository> SettingsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Settings for `user_id`, falling back to defaults when none are stored.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, user_id: &str) -> Result<UserSettings, RelayHubError> {
        Ok(self.repo.get(user_id).await?.unwrap_or_default())
    }

    /// Validate and persist a full settings document.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::Validation`] when a field is out of range, or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self, settings))]
    pub async fn update(
        &self,
        user_id: &str,
        settings: UserSettings,
    ) -> Result<UserSettings, RelayHubError> {
        settings.validate()?;
        self.repo.put(user_id, &settings).await?;
        Ok(settings)
    }
}
