//! Storage ports: the path-based store holding relays, sensors, timers and
//! settings.
//!
//! Relay values cross this boundary as *stored levels*; applying the board
//! polarity is the relay service's job, not the store's.

use std::future::Future;
use std::sync::Arc;

use relayhub_domain::device::Device;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::sensor::SensorSnapshot;
use relayhub_domain::settings::UserSettings;
use relayhub_domain::timer::Timer;

/// Raw relay levels under `relays/{relay1..4}`.
pub trait RelayStore {
    /// Read one stored level, `None` when never written.
    fn read(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<bool>, RelayHubError>> + Send;

    /// Read the stored level of every device, in relay order.
    fn read_all(
        &self,
    ) -> impl Future<Output = Result<Vec<(Device, Option<bool>)>, RelayHubError>> + Send;

    /// Absolute write of a stored level.
    fn write(
        &self,
        device: Device,
        level: bool,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send;
}

/// Read-only access to `sensors/*`.
pub trait SensorSource {
    /// Latest snapshot, `None` when the board has never reported.
    fn snapshot(&self) -> impl Future<Output = Result<Option<SensorSnapshot>, RelayHubError>> + Send;
}

/// Timer records under `timers/{relay1..4}`, one per device.
pub trait TimerRepository {
    /// Insert or replace the timer of `timer.relay_key`.
    fn put(&self, timer: Timer) -> impl Future<Output = Result<(), RelayHubError>> + Send;

    fn get(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<Timer>, RelayHubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Timer>, RelayHubError>> + Send;

    /// Remove the timer of `device`, returning whether one existed.
    fn delete(&self, device: Device) -> impl Future<Output = Result<bool, RelayHubError>> + Send;

    /// Remove the timer of `device` only while it is still the record created
    /// at `created_at`, returning whether it was removed.
    ///
    /// A timer replaced in the meantime is left in place.
    fn delete_if(
        &self,
        device: Device,
        created_at: i64,
    ) -> impl Future<Output = Result<bool, RelayHubError>> + Send;
}

/// Per-user preference documents under `settings/{userId}`.
pub trait SettingsRepository {
    fn get(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserSettings>, RelayHubError>> + Send;

    fn put(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send;
}

impl<T: RelayStore + Send + Sync> RelayStore for Arc<T> {
    fn read(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<bool>, RelayHubError>> + Send {
        (**self).read(device)
    }

    fn read_all(
        &self,
    ) -> impl Future<Output = Result<Vec<(Device, Option<bool>)>, RelayHubError>> + Send {
        (**self).read_all()
    }

    fn write(
        &self,
        device: Device,
        level: bool,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        (**self).write(device, level)
    }
}

impl<T: SensorSource + Send + Sync> SensorSource for Arc<T> {
    fn snapshot(&self) -> impl Future<Output = Result<Option<SensorSnapshot>, RelayHubError>> + Send {
        (**self).snapshot()
    }
}

impl<T: TimerRepository + Send + Sync> TimerRepository for Arc<T> {
    fn put(&self, timer: Timer) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        (**self).put(timer)
    }

    fn get(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<Timer>, RelayHubError>> + Send {
        (**self).get(device)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Timer>, RelayHubError>> + Send {
        (**self).get_all()
    }

    fn delete(&self, device: Device) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        (**self).delete(device)
    }

    fn delete_if(
        &self,
        device: Device,
        created_at: i64,
    ) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        (**self).delete_if(device, created_at)
    }
}

impl<T: SettingsRepository + Send + Sync> SettingsRepository for Arc<T> {
    fn get(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserSettings>, RelayHubError>> + Send {
        (**self).get(user_id)
    }

    fn put(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        (**self).put(user_id, settings)
    }
}
