//! Timer scheduler: owns timer completion.
//!
//! Timers live in the [`TimerRepository`]; the scheduler polls them, executes
//! due actions through the [`RelayService`] and removes the records. Relay
//! writes are absolute, so a timer executed twice (two processes, or a tick
//! racing a manual cancel) leaves the device in the same state.

use std::sync::Arc;
use std::time::Duration;

use relayhub_domain::device::Device;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::time::{self, Timestamp};
use relayhub_domain::timer::{Timer, TimerAction, TimerDuration, format_clock};

use crate::background::{TaskHandle, spawn_periodic};
use crate::ports::{RelayStore, TimerRepository};
use crate::services::relay_service::RelayService;

/// Handle returned by [`TimerScheduler::start`].
pub type SchedulerHandle = TaskHandle;

/// A stored timer together with its countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTimer {
    pub timer: Timer,
    pub remaining_seconds: u64,
}

impl ActiveTimer {
    /// Countdown formatted as `MM:SS` or `HH:MM:SS`.
    #[must_use]
    pub fn remaining_clock(&self) -> String {
        format_clock(self.remaining_seconds)
    }
}

pub struct TimerScheduler<T, S> {
    timers: T,
    relays: RelayService<S>,
}

impl<T: TimerRepository, S: RelayStore> TimerScheduler<T, S> {
    pub fn new(timers: T, relays: RelayService<S>) -> Self {
        Self { timers, relays }
    }

    /// Schedule `action` on `device`, replacing any existing timer.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::Validation`] for a zero duration, or a
    /// storage error when the record cannot be written.
    #[tracing::instrument(skip(self))]
    pub async fn set_timer(
        &self,
        device: Device,
        duration: TimerDuration,
        action: TimerAction,
    ) -> Result<Timer, RelayHubError> {
        let timer = Timer::schedule(device, duration, action, time::now()).inspect_err(|err| {
            tracing::warn!(%err, "timer rejected");
        })?;
        self.timers.put(timer.clone()).await.inspect_err(|err| {
            tracing::error!(%err, "failed to store timer");
        })?;
        tracing::info!(
            relay = device.relay_key(),
            %action,
            after = %format_clock(timer.duration),
            "timer set"
        );
        Ok(timer)
    }

    /// Delete the timer of `device` without touching the relay.
    ///
    /// Returns whether a timer existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_timer(&self, device: Device) -> Result<bool, RelayHubError> {
        let existed = self.timers.delete(device).await.inspect_err(|err| {
            tracing::error!(%err, "failed to cancel timer");
        })?;
        if existed {
            tracing::info!(relay = device.relay_key(), "timer cancelled");
        }
        Ok(existed)
    }

    /// Timers with their countdown, in relay order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn active_timers(&self) -> Result<Vec<ActiveTimer>, RelayHubError> {
        self.active_timers_at(time::now()).await
    }

    /// Same as [`active_timers`](Self::active_timers) with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn active_timers_at(&self, now: Timestamp) -> Result<Vec<ActiveTimer>, RelayHubError> {
        let mut timers: Vec<ActiveTimer> = self
            .timers
            .get_all()
            .await?
            .into_iter()
            .map(|timer| ActiveTimer {
                remaining_seconds: timer.remaining_seconds(now),
                timer,
            })
            .collect();
        timers.sort_by_key(|t| t.timer.relay_key);
        Ok(timers)
    }

    /// Execute and retire every timer due at `now`.
    ///
    /// A failing relay write is logged and the timer is still removed; other
    /// devices are processed regardless. Only the record that fired is
    /// removed, so a timer set for the same device during the relay write
    /// survives. Returns the devices whose timer fired.
    ///
    /// # Errors
    ///
    /// Returns a storage error only when the timer list cannot be read.
    pub async fn tick_at(&self, now: Timestamp) -> Result<Vec<Device>, RelayHubError> {
        let due: Vec<Timer> = self
            .timers
            .get_all()
            .await?
            .into_iter()
            .filter(|t| t.is_due(now))
            .collect();

        let mut fired = Vec::with_capacity(due.len());
        for timer in due {
            let device = timer.device();
            match self.relays.set(device, timer.action.turns_on()).await {
                Ok(()) => tracing::info!(
                    relay = device.relay_key(),
                    action = %timer.action,
                    "timer executed"
                ),
                Err(err) => tracing::error!(
                    relay = device.relay_key(),
                    %err,
                    "failed to execute timer action"
                ),
            }
            match self.timers.delete_if(device, timer.created_at).await {
                Ok(true) => {}
                Ok(false) => tracing::debug!(
                    relay = device.relay_key(),
                    "timer replaced while firing, keeping the new one"
                ),
                Err(err) => {
                    tracing::error!(relay = device.relay_key(), %err, "failed to remove timer");
                }
            }
            fired.push(device);
        }
        Ok(fired)
    }

    /// # Errors
    ///
    /// Returns a storage error only when the timer list cannot be read.
    pub async fn tick(&self) -> Result<Vec<Device>, RelayHubError> {
        self.tick_at(time::now()).await
    }
}

impl<T, S> TimerScheduler<T, S>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
{
    /// Poll timers every `period` on a background task.
    pub fn start(self: Arc<Self>, period: Duration) -> SchedulerHandle {
        spawn_periodic("timer_scheduler", period, move || {
            let scheduler = Arc::clone(&self);
            async move {
                if let Err(err) = scheduler.tick().await {
                    tracing::warn!(%err, "timer tick failed, retrying next period");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::InMemoryStore;
    use relayhub_domain::device::Polarity;
    use relayhub_domain::error::ValidationError;

    type Scheduler = TimerScheduler<Arc<InMemoryStore>, Arc<InMemoryStore>>;

    fn scheduler(store: &Arc<InMemoryStore>) -> Scheduler {
        TimerScheduler::new(
            Arc::clone(store),
            RelayService::new(Arc::clone(store), Polarity::ActiveLow),
        )
    }

    fn due_timer(device: Device, action: TimerAction) -> Timer {
        Timer {
            relay_key: device,
            end_time: 1_000,
            duration: 1,
            action,
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn should_replace_existing_timer_when_set_again() {
        let store = Arc::new(InMemoryStore::default());
        let svc = scheduler(&store);
        svc.set_timer(Device::Light1, TimerDuration::from_secs(5), TimerAction::Off)
            .await
            .unwrap();
        svc.set_timer(Device::Light1, TimerDuration::from_secs(1), TimerAction::On)
            .await
            .unwrap();

        assert_eq!(store.timer_count(), 1);
        let timer = store.timer(Device::Light1).unwrap();
        assert_eq!(timer.action, TimerAction::On);
        assert_eq!(timer.duration, 1);
    }

    #[tokio::test]
    async fn should_reject_zero_duration_without_storing() {
        let store = Arc::new(InMemoryStore::default());
        let result = scheduler(&store)
            .set_timer(Device::Fan, TimerDuration::default(), TimerAction::Off)
            .await;
        assert!(matches!(
            result,
            Err(RelayHubError::Validation(ValidationError::NonPositiveDuration))
        ));
        assert_eq!(store.timer_count(), 0);
    }

    #[tokio::test]
    async fn should_surface_store_failure_when_setting() {
        let store = Arc::new(InMemoryStore::default());
        store.fail_writes(true);
        let result = scheduler(&store)
            .set_timer(Device::Fan, TimerDuration::from_secs(10), TimerAction::Off)
            .await;
        assert!(matches!(result, Err(RelayHubError::Storage(_))));
    }

    #[tokio::test]
    async fn should_cancel_without_touching_relay() {
        let store = Arc::new(InMemoryStore::default());
        let svc = scheduler(&store);
        svc.set_timer(Device::Fan, TimerDuration::from_secs(60), TimerAction::Off)
            .await
            .unwrap();
        assert!(svc.cancel_timer(Device::Fan).await.unwrap());
        assert!(!svc.cancel_timer(Device::Fan).await.unwrap());
        assert_eq!(store.relay(Device::Fan), None);
    }

    #[tokio::test]
    async fn should_execute_due_timer_exactly_once() {
        let store = Arc::new(InMemoryStore::default());
        store.insert_timer(due_timer(Device::Fan, TimerAction::Off));
        let svc = scheduler(&store);
        let now = time::from_millis(5_000);

        assert_eq!(svc.tick_at(now).await.unwrap(), vec![Device::Fan]);
        assert_eq!(store.relay(Device::Fan), Some(true));
        assert_eq!(store.timer_count(), 0);

        assert!(svc.tick_at(now).await.unwrap().is_empty());
        assert_eq!(store.relay_writes(), 1);
    }

    #[tokio::test]
    async fn should_keep_timer_set_while_due_one_fires() {
        let store = Arc::new(InMemoryStore::default());
        store.insert_timer(due_timer(Device::Fan, TimerAction::Off));
        let replacement = Timer {
            relay_key: Device::Fan,
            end_time: 3_604_000,
            duration: 3600,
            action: TimerAction::On,
            created_at: 4_000,
        };
        store.insert_timer_on_next_relay_write(replacement.clone());
        let svc = scheduler(&store);

        assert_eq!(
            svc.tick_at(time::from_millis(5_000)).await.unwrap(),
            vec![Device::Fan]
        );
        assert_eq!(store.relay(Device::Fan), Some(true));
        assert_eq!(store.timer(Device::Fan), Some(replacement));
    }

    #[tokio::test]
    async fn should_keep_timer_until_deadline() {
        let store = Arc::new(InMemoryStore::default());
        store.insert_timer(due_timer(Device::Light2, TimerAction::On));
        let svc = scheduler(&store);

        assert!(svc.tick_at(time::from_millis(999)).await.unwrap().is_empty());
        assert_eq!(store.timer_count(), 1);
        assert_eq!(store.relay(Device::Light2), None);
    }

    #[tokio::test]
    async fn should_continue_when_one_device_fails() {
        let store = Arc::new(InMemoryStore::default());
        store.insert_timer(due_timer(Device::Light1, TimerAction::On));
        store.insert_timer(due_timer(Device::Fan, TimerAction::On));
        store.break_relay(Device::Light1);
        let svc = scheduler(&store);

        let fired = svc.tick_at(time::from_millis(2_000)).await.unwrap();
        assert_eq!(fired, vec![Device::Light1, Device::Fan]);
        assert_eq!(store.relay(Device::Fan), Some(false));
        assert_eq!(store.relay(Device::Light1), None);
        assert_eq!(store.timer_count(), 0);
    }

    #[tokio::test]
    async fn should_list_active_timers_with_remaining_time() {
        let store = Arc::new(InMemoryStore::default());
        store.insert_timer(Timer {
            relay_key: Device::Fan,
            end_time: 1_801_000,
            duration: 1800,
            action: TimerAction::Off,
            created_at: 1_000,
        });
        let active = scheduler(&store)
            .active_timers_at(time::from_millis(1_000))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].remaining_seconds, 1800);
        assert_eq!(active[0].remaining_clock(), "30:00");
    }

    #[tokio::test]
    async fn should_fire_timers_from_background_task() {
        let store = Arc::new(InMemoryStore::default());
        store.insert_timer(due_timer(Device::Extra, TimerAction::On));
        let handle = Arc::new(scheduler(&store)).start(Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop().await;

        assert_eq!(store.timer_count(), 0);
        assert_eq!(store.relay(Device::Extra), Some(false));
    }
}
