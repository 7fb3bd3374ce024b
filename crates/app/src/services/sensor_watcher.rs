//! Sensor watcher: motion lighting and fire alerts.
//!
//! Polls the sensor snapshot together with the configured user's settings:
//!
//! - motion switches lights and fan on once; after the configured number of
//!   minutes without motion everything is switched off again
//! - a flame rising edge raises a single alert, re-armed when the flame clears

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use relayhub_domain::error::RelayHubError;
use relayhub_domain::sensor::SensorSnapshot;
use relayhub_domain::settings::UserSettings;
use relayhub_domain::time::{self, Timestamp};

use crate::background::{TaskHandle, spawn_periodic};
use crate::ports::{RelayStore, SensorSource, SettingsRepository};
use crate::services::relay_service::RelayService;
use crate::services::settings_service::SettingsService;

/// What a poll did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchOutcome {
    pub lights_on: bool,
    pub lights_off: bool,
    pub fire_alert: bool,
}

#[derive(Debug, Default)]
struct WatchState {
    /// Lights were switched on by motion and not switched off since.
    lights_on: bool,
    auto_off_at: Option<Timestamp>,
    last_flame: bool,
    fire_notified: bool,
}

pub struct SensorWatcher<Z, S, R> {
    sensors: Z,
    relays: RelayService<S>,
    settings: SettingsService<R>,
    user_id: String,
    state: Mutex<WatchState>,
}

impl<Z, S, R> SensorWatcher<Z, S, R>
where
    Z: SensorSource,
    S: RelayStore,
    R: SettingsRepository,
{
    pub fn new(
        sensors: Z,
        relays: RelayService<S>,
        settings: SettingsService<R>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            sensors,
            relays,
            settings,
            user_id: user_id.into(),
            state: Mutex::new(WatchState::default()),
        }
    }

    /// Read sensors and settings, then react.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot or settings cannot be read.
    pub async fn poll_at(&self, now: Timestamp) -> Result<WatchOutcome, RelayHubError> {
        let Some(snapshot) = self.sensors.snapshot().await? else {
            return Ok(WatchOutcome::default());
        };
        let settings = self.settings.get(&self.user_id).await?;

        let mut outcome = WatchOutcome {
            fire_alert: self.check_fire(&snapshot, &settings),
            ..WatchOutcome::default()
        };
        self.check_motion(&snapshot, &settings, now, &mut outcome)
            .await;
        Ok(outcome)
    }

    fn check_fire(&self, snapshot: &SensorSnapshot, settings: &UserSettings) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !settings.sensors.flame_sensor_enabled {
            state.fire_notified = false;
            return false;
        }
        if settings.automation.holiday_mode {
            return false;
        }

        let mut alerted = false;
        if snapshot.flame && !state.last_flame && !state.fire_notified {
            state.fire_notified = true;
            if settings.notifications.fire_alerts_active() {
                tracing::warn!(user_id = %self.user_id, "🔥 fire detected");
                alerted = true;
            }
        }
        if !snapshot.flame && state.last_flame {
            tracing::info!(user_id = %self.user_id, "fire cleared");
            state.fire_notified = false;
        }
        state.last_flame = snapshot.flame;
        alerted
    }

    async fn check_motion(
        &self,
        snapshot: &SensorSnapshot,
        settings: &UserSettings,
        now: Timestamp,
        outcome: &mut WatchOutcome,
    ) {
        if !settings.motion_lighting_active() {
            return;
        }

        let (switch_on, switch_off) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if snapshot.motion {
                state.auto_off_at = None;
                (!state.lights_on, false)
            } else if state.lights_on {
                let minutes = i64::from(settings.automation.motion_auto_off_minutes);
                let deadline = *state
                    .auto_off_at
                    .get_or_insert_with(|| now + chrono::TimeDelta::minutes(minutes));
                if now >= deadline {
                    state.auto_off_at = None;
                    (false, true)
                } else {
                    (false, false)
                }
            } else {
                (false, false)
            }
        };

        if switch_on {
            tracing::info!("motion detected, turning on lights");
            match self.relays.turn_all_on().await {
                Ok(()) => {
                    self.state
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .lights_on = true;
                    outcome.lights_on = true;
                }
                Err(err) => tracing::error!(%err, "failed to turn on lights for motion"),
            }
        }
        if switch_off {
            tracing::info!("no motion, auto-off expired, turning off lights");
            match self.relays.turn_all_off().await {
                Ok(()) => {
                    self.state
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .lights_on = false;
                    outcome.lights_off = true;
                }
                Err(err) => tracing::error!(%err, "failed to turn off lights"),
            }
        }
    }
}

impl<Z, S, R> SensorWatcher<Z, S, R>
where
    Z: SensorSource + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
{
    /// Poll every `period` on a background task.
    pub fn start(self: Arc<Self>, period: Duration) -> TaskHandle {
        spawn_periodic("sensor_watcher", period, move || {
            let watcher = Arc::clone(&self);
            async move {
                if let Err(err) = watcher.poll_at(time::now()).await {
                    tracing::warn!(%err, "sensor poll failed, retrying next period");
                }
            }
        })
    }
}
