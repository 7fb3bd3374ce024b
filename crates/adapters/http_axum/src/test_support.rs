//! In-memory ports and request helpers for handler tests.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use relayhub_app::ports::{
    LanguageModel, LanguageModelError, RelayStore, SensorSource, SettingsRepository,
    TimerRepository,
};
use relayhub_app::services::assistant::Assistant;
use relayhub_app::services::command_interpreter::CommandInterpreter;
use relayhub_app::services::relay_service::RelayService;
use relayhub_app::services::settings_service::SettingsService;
use relayhub_app::services::status_service::StatusService;
use relayhub_app::services::timer_scheduler::TimerScheduler;
use relayhub_domain::chat::ChatMessage;
use relayhub_domain::device::{Device, Polarity};
use relayhub_domain::error::RelayHubError;
use relayhub_domain::sensor::SensorSnapshot;
use relayhub_domain::settings::UserSettings;
use relayhub_domain::timer::Timer;

use crate::state::AppState;

#[derive(Default)]
pub struct MemoryStore {
    pub relays: Mutex<HashMap<Device, bool>>,
    pub sensors: Mutex<Option<SensorSnapshot>>,
    pub timers: Mutex<BTreeMap<Device, Timer>>,
    pub settings: Mutex<HashMap<String, UserSettings>>,
}

impl RelayStore for MemoryStore {
    fn read(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<bool>, RelayHubError>> + Send {
        let level = self.relays.lock().unwrap().get(&device).copied();
        async move { Ok(level) }
    }

    fn read_all(
        &self,
    ) -> impl Future<Output = Result<Vec<(Device, Option<bool>)>, RelayHubError>> + Send {
        let relays = self.relays.lock().unwrap();
        let all = Device::ALL
            .into_iter()
            .map(|device| (device, relays.get(&device).copied()))
            .collect();
        async move { Ok(all) }
    }

    fn write(
        &self,
        device: Device,
        level: bool,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        self.relays.lock().unwrap().insert(device, level);
        async move { Ok(()) }
    }
}

impl SensorSource for MemoryStore {
    fn snapshot(&self) -> impl Future<Output = Result<Option<SensorSnapshot>, RelayHubError>> + Send {
        let snapshot = self.sensors.lock().unwrap().clone();
        async move { Ok(snapshot) }
    }
}

impl TimerRepository for MemoryStore {
    fn put(&self, timer: Timer) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        self.timers.lock().unwrap().insert(timer.device(), timer);
        async move { Ok(()) }
    }

    fn get(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<Timer>, RelayHubError>> + Send {
        let timer = self.timers.lock().unwrap().get(&device).cloned();
        async move { Ok(timer) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Timer>, RelayHubError>> + Send {
        let timers = self.timers.lock().unwrap().values().cloned().collect();
        async move { Ok(timers) }
    }

    fn delete(&self, device: Device) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        let existed = self.timers.lock().unwrap().remove(&device).is_some();
        async move { Ok(existed) }
    }

    fn delete_if(
        &self,
        device: Device,
        created_at: i64,
    ) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        let mut timers = self.timers.lock().unwrap();
        let removed = timers
            .get(&device)
            .is_some_and(|timer| timer.created_at == created_at)
            && timers.remove(&device).is_some();
        async move { Ok(removed) }
    }
}

impl SettingsRepository for MemoryStore {
    fn get(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserSettings>, RelayHubError>> + Send {
        let settings = self.settings.lock().unwrap().get(user_id).cloned();
        async move { Ok(settings) }
    }

    fn put(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        self.settings
            .lock()
            .unwrap()
            .insert(user_id.to_string(), settings.clone());
        async move { Ok(()) }
    }
}

/// Model that echoes the last message back, or fails when `reply` is `None`.
pub struct EchoModel {
    pub reply: Option<&'static str>,
}

impl LanguageModel for EchoModel {
    fn generate(
        &self,
        _prompt: &str,
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send {
        let reply = self.reply;
        async move {
            reply
                .map(str::to_string)
                .ok_or_else(|| LanguageModelError::Unreachable("connection refused".to_string()))
        }
    }

    fn chat(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, LanguageModelError>> + Send {
        let reply = self
            .reply
            .map(|prefix| format!("{prefix} ({} messages)", messages.len()));
        async move { reply.ok_or(LanguageModelError::Timeout) }
    }
}

pub type Store = Arc<MemoryStore>;
pub type TestState = AppState<Store, Store, Store, Store, EchoModel>;

pub fn state(store: &Store, model: EchoModel) -> TestState {
    let relays = RelayService::new(Arc::clone(store), Polarity::ActiveLow);
    let scheduler = Arc::new(TimerScheduler::new(Arc::clone(store), relays.clone()));
    let interpreter = CommandInterpreter::new(
        relays,
        Arc::clone(&scheduler),
        StatusService::new(Arc::clone(store)),
    );
    AppState::new(
        Arc::new(Assistant::new(interpreter, model)),
        scheduler,
        Arc::new(SettingsService::new(Arc::clone(store))),
    )
}

pub fn app(store: &Store) -> Router {
    crate::router::build(state(store, EchoModel { reply: Some("echo") }))
}

/// Send one request and decode the JSON body (`Null` when empty).
pub async fn call(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}
