//! Relay service: logical on/off control of the four devices.
//!
//! Every write is absolute (set, never flip blindly), so repeating a call
//! is harmless.

use relayhub_domain::device::{Device, Polarity, RelayState};
use relayhub_domain::error::RelayHubError;

use crate::ports::RelayStore;

/// Application service translating logical states through the board polarity.
#[derive(Debug, Clone)]
pub struct RelayService<S> {
    store: S,
    polarity: Polarity,
}

impl<S: RelayStore> RelayService<S> {
    pub fn new(store: S, polarity: Polarity) -> Self {
        Self { store, polarity }
    }

    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Switch one device on or off.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn set(&self, device: Device, on: bool) -> Result<(), RelayHubError> {
        self.store
            .write(device, self.polarity.to_stored(on))
            .await
    }

    /// Switch several devices to the same state, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    #[tracing::instrument(skip(self))]
    pub async fn set_many(&self, devices: &[Device], on: bool) -> Result<(), RelayHubError> {
        for device in devices {
            self.set(*device, on).await?;
        }
        Ok(())
    }

    /// Every relay off, extra outlet included.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    pub async fn turn_all_off(&self) -> Result<(), RelayHubError> {
        self.set_many(&Device::ALL, false).await
    }

    /// Lights and fan on. The extra outlet keeps its state.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    pub async fn turn_all_on(&self) -> Result<(), RelayHubError> {
        self.set_many(&Device::LIGHTS_AND_FAN, true).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn state(&self, device: Device) -> Result<RelayState, RelayHubError> {
        let stored = self.store.read(device).await?;
        Ok(RelayState::from_stored(stored, self.polarity))
    }

    /// Logical state of every device, in relay order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn states(&self) -> Result<Vec<(Device, RelayState)>, RelayHubError> {
        let stored = self.store.read_all().await?;
        Ok(stored
            .into_iter()
            .map(|(device, level)| (device, RelayState::from_stored(level, self.polarity)))
            .collect())
    }

    /// Invert the current state (unknown counts as off). Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, device: Device) -> Result<bool, RelayHubError> {
        let on = !self.state(device).await?.is_on();
        self.set(device, on).await?;
        Ok(on)
    }
}
