//! JSON handlers for per-user settings.

use axum::Json;
use axum::extract::{Path, State};

use relayhub_app::ports::{
    LanguageModel, RelayStore, SensorSource, SettingsRepository, TimerRepository,
};
use relayhub_domain::settings::UserSettings;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/settings/:user_id`
pub async fn get<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserSettings>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    Ok(Json(state.settings.get(&user_id).await?))
}

/// `PUT /api/settings/:user_id`
///
/// Missing groups and fields take their default values.
pub async fn update<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Path(user_id): Path<String>,
    Json(settings): Json<UserSettings>,
) -> Result<Json<UserSettings>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    Ok(Json(state.settings.update(&user_id, settings).await?))
}
