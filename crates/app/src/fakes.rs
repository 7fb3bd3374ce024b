//! In-memory port implementations shared by the service tests.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use relayhub_domain::chat::ChatMessage;
use relayhub_domain::device::Device;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::sensor::SensorSnapshot;
use relayhub_domain::settings::UserSettings;
use relayhub_domain::timer::Timer;

use crate::ports::{
    LanguageModel, LanguageModelError, RelayStore, SensorSource, SettingsRepository,
    TimerRepository,
};

fn unavailable() -> RelayHubError {
    RelayHubError::Storage(Box::new(std::io::Error::other("store unavailable")))
}

#[derive(Default)]
pub struct InMemoryStore {
    relays: Mutex<HashMap<Device, bool>>,
    sensors: Mutex<Option<SensorSnapshot>>,
    timers: Mutex<BTreeMap<Device, Timer>>,
    settings: Mutex<HashMap<String, UserSettings>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    /// Devices whose relay writes fail while others succeed.
    broken: Mutex<Vec<Device>>,
    writes: AtomicUsize,
    /// Timer stored as a side effect of the next relay write.
    pending_timer: Mutex<Option<Timer>>,
}

impl InMemoryStore {
    pub fn relay(&self, device: Device) -> Option<bool> {
        self.relays.lock().unwrap().get(&device).copied()
    }

    pub fn set_relay(&self, device: Device, level: bool) {
        self.relays.lock().unwrap().insert(device, level);
    }

    pub fn set_sensors(&self, snapshot: SensorSnapshot) {
        *self.sensors.lock().unwrap() = Some(snapshot);
    }

    pub fn timer(&self, device: Device) -> Option<Timer> {
        self.timers.lock().unwrap().get(&device).cloned()
    }

    pub fn timer_count(&self) -> usize {
        self.timers.lock().unwrap().len()
    }

    pub fn insert_timer(&self, timer: Timer) {
        self.timers.lock().unwrap().insert(timer.relay_key, timer);
    }

    pub fn insert_settings(&self, user_id: &str, settings: UserSettings) {
        self.settings
            .lock()
            .unwrap()
            .insert(user_id.to_string(), settings);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Simulate a concurrent `set_timer` landing while a relay write is in flight.
    pub fn insert_timer_on_next_relay_write(&self, timer: Timer) {
        *self.pending_timer.lock().unwrap() = Some(timer);
    }

    pub fn break_relay(&self, device: Device) {
        self.broken.lock().unwrap().push(device);
    }

    pub fn relay_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn reads_fail(&self) -> bool {
        self.fail_reads.load(Ordering::SeqCst)
    }

    fn writes_fail(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }
}

impl RelayStore for InMemoryStore {
    fn read(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<bool>, RelayHubError>> + Send {
        let result = if self.reads_fail() {
            Err(unavailable())
        } else {
            Ok(self.relay(device))
        };
        async move { result }
    }

    fn read_all(
        &self,
    ) -> impl Future<Output = Result<Vec<(Device, Option<bool>)>, RelayHubError>> + Send {
        let result = if self.reads_fail() {
            Err(unavailable())
        } else {
            Ok(Device::ALL.iter().map(|d| (*d, self.relay(*d))).collect())
        };
        async move { result }
    }

    fn write(
        &self,
        device: Device,
        level: bool,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        let broken = self.broken.lock().unwrap().contains(&device);
        let result = if self.writes_fail() || broken {
            Err(unavailable())
        } else {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.set_relay(device, level);
            if let Some(timer) = self.pending_timer.lock().unwrap().take() {
                self.insert_timer(timer);
            }
            Ok(())
        };
        async move { result }
    }
}

impl SensorSource for InMemoryStore {
    fn snapshot(&self) -> impl Future<Output = Result<Option<SensorSnapshot>, RelayHubError>> + Send {
        let result = if self.reads_fail() {
            Err(unavailable())
        } else {
            Ok(self.sensors.lock().unwrap().clone())
        };
        async move { result }
    }
}

impl TimerRepository for InMemoryStore {
    fn put(&self, timer: Timer) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        let result = if self.writes_fail() {
            Err(unavailable())
        } else {
            self.insert_timer(timer);
            Ok(())
        };
        async move { result }
    }

    fn get(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<Timer>, RelayHubError>> + Send {
        let result = Ok(self.timer(device));
        async move { result }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Timer>, RelayHubError>> + Send {
        let result = if self.reads_fail() {
            Err(unavailable())
        } else {
            Ok(self.timers.lock().unwrap().values().cloned().collect())
        };
        async move { result }
    }

    fn delete(&self, device: Device) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        let result = if self.writes_fail() {
            Err(unavailable())
        } else {
            Ok(self.timers.lock().unwrap().remove(&device).is_some())
        };
        async move { result }
    }

    fn delete_if(
        &self,
        device: Device,
        created_at: i64,
    ) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        let result = if self.writes_fail() {
            Err(unavailable())
        } else {
            let mut timers = self.timers.lock().unwrap();
            let matches = timers
                .get(&device)
                .is_some_and(|timer| timer.created_at == created_at);
            if matches {
                timers.remove(&device);
            }
            Ok(matches)
        };
        async move { result }
    }
}

impl SettingsRepository for InMemoryStore {
    fn get(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserSettings>, RelayHubError>> + Send {
        let result = if self.reads_fail() {
            Err(unavailable())
        } else {
            Ok(self.settings.lock().unwrap().get(user_id).cloned())
        };
        async move { result }
    }

    fn put(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        let result = if self.writes_fail() {
            Err(unavailable())
        } else {
            self.insert_settings(user_id, settings.clone());
            Ok(())
        };
        async move { result }
    }
}

/// Scripted language model recording every request.
#[derive(Default)]
pub struct FakeModel {
    reply: Mutex<Option<String>>,
    failure: Mutex<Option<fn() -> LanguageModelError>>,
    prompts: Mutex<Vec<String>>,
    conversations: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Self {
        let model = Self::default();
        *model.reply.lock().unwrap() = Some(reply.to_string());
        model
    }

    pub fn failing(failure: fn() -> LanguageModelError) -> Self {
        let model = Self::default();
        *model.failure.lock().unwrap() = Some(failure);
        model
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn conversations(&self) -> Vec<Vec<ChatMessage>> {
        self.conversations.lock().unwrap().clone()
    }

    fn answer(&self) -> Result<String, LanguageModelError> {
        if let Some(failure) = *self.failure.lock().unwrap() {
            return Err(failure());
        }
        Ok(self.reply.lock().unwrap().clone().unwrap_or_default())
    }
}

impl LanguageModel for FakeModel {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let result = self.answer();
        async move { result }
    }

    fn chat(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send {
        self.conversations.lock().unwrap().push(messages.to_vec());
        let result = self.answer();
        async move { result }
    }
}
