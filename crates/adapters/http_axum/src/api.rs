//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod chat;
#[allow(clippy::missing_errors_doc)]
pub mod commands;
#[allow(clippy::missing_errors_doc)]
pub mod relays;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;
#[allow(clippy::missing_errors_doc)]
pub mod settings;
#[allow(clippy::missing_errors_doc)]
pub mod timers;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};

use relayhub_app::ports::{
    LanguageModel, RelayStore, SensorSource, SettingsRepository, TimerRepository,
};
use relayhub_domain::device::Device;
use relayhub_domain::error::RelayHubError;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<T, S, Z, R, M>() -> Router<AppState<T, S, Z, R, M>>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    Router::new()
        // Assistant
        .route("/chat", post(chat::send::<T, S, Z, R, M>))
        .route("/chat/{session_id}", delete(chat::clear::<T, S, Z, R, M>))
        .route("/commands", post(commands::run::<T, S, Z, R, M>))
        // Relays
        .route("/relays", get(relays::list::<T, S, Z, R, M>))
        .route("/relays/all", post(relays::set_all::<T, S, Z, R, M>))
        .route("/relays/{device}", put(relays::set::<T, S, Z, R, M>))
        .route(
            "/relays/{device}/toggle",
            post(relays::toggle::<T, S, Z, R, M>),
        )
        // Timers
        .route("/timers", get(timers::list::<T, S, Z, R, M>))
        .route(
            "/timers/{device}",
            put(timers::set::<T, S, Z, R, M>).delete(timers::cancel::<T, S, Z, R, M>),
        )
        // Sensors
        .route("/sensors", get(sensors::snapshot::<T, S, Z, R, M>))
        .route("/sensors/water", get(sensors::water::<T, S, Z, R, M>))
        // Settings
        .route(
            "/settings/{user_id}",
            get(settings::get::<T, S, Z, R, M>).put(settings::update::<T, S, Z, R, M>),
        )
}

/// Resolve a `{device}` path segment (`fan` or `relay3`).
fn parse_device(raw: &str) -> Result<Device, ApiError> {
    raw.parse::<Device>()
        .map_err(|err| ApiError::from(RelayHubError::from(err)))
}

/// Empty response for successful deletions.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}
