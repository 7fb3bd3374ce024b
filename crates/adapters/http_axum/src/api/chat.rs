//! JSON handlers for the assistant.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use relayhub_app::ports::{
    LanguageModel, RelayStore, SensorSource, SettingsRepository, TimerRepository,
};
use relayhub_domain::error::{NotFoundError, RelayHubError};

use super::DeleteResponse;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Multi-turn mode when present.
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    /// `command`, `model` or `fallback`.
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

/// `POST /api/chat`
pub async fn send<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let reply = match req.session_id {
        Some(session) => state.assistant.chat(session, &req.message).await?,
        None => state.assistant.reply(&req.message).await?,
    };
    Ok(Json(ChatResponse {
        reply: reply.text,
        source: reply.source.as_str(),
        session_id: req.session_id,
    }))
}

/// `DELETE /api/chat/:session_id`
pub async fn clear<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Path(session_id): Path<Uuid>,
) -> Result<DeleteResponse, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    if state.assistant.sessions().clear(session_id) {
        Ok(DeleteResponse::NoContent)
    } else {
        Err(RelayHubError::from(NotFoundError {
            entity: "Chat session",
            id: session_id.to_string(),
        })
        .into())
    }
}
