//! Interpreter-only endpoint: runs the command rules without the model.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use relayhub_app::ports::{
    LanguageModel, RelayStore, SensorSource, SettingsRepository, TimerRepository,
};

use crate::state::AppState;

#[derive(Deserialize)]
pub struct CommandRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

/// `POST /api/commands`
pub async fn run<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Json(req): Json<CommandRequest>,
) -> Json<CommandResponse>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let reply = state.assistant.interpreter().handle(&req.text).await;
    Json(CommandResponse {
        handled: reply.is_some(),
        reply,
    })
}
