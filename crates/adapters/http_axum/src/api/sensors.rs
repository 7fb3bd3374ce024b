//! JSON handlers for sensor readings.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use relayhub_app::ports::{
    LanguageModel, RelayStore, SensorSource, SettingsRepository, TimerRepository,
};
use relayhub_app::services::status_service::WATER_UNAVAILABLE;
use relayhub_domain::error::{NotFoundError, RelayHubError};
use relayhub_domain::sensor::{SensorSnapshot, WaterTankStatus, describe_water};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SensorsResponse {
    pub snapshot: SensorSnapshot,
    pub water_tank: Option<WaterTankStatus>,
}

#[derive(Debug, Serialize)]
pub struct WaterResponse {
    /// The same sentence the assistant answers with.
    pub message: String,
    pub distance: Option<f64>,
    pub tank: Option<WaterTankStatus>,
}

/// `GET /api/sensors`
pub async fn snapshot<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
) -> Result<Json<SensorsResponse>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let Some(snapshot) = state.status().snapshot().await? else {
        return Err(RelayHubError::from(NotFoundError {
            entity: "Sensor snapshot",
            id: "sensors".to_string(),
        })
        .into());
    };
    Ok(Json(SensorsResponse {
        water_tank: snapshot.water_tank(),
        snapshot,
    }))
}

/// `GET /api/sensors/water`
pub async fn water<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
) -> Result<Json<WaterResponse>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let response = match state.status().water_tank().await? {
        Some((distance, tank)) => WaterResponse {
            message: describe_water(distance),
            distance: Some(distance),
            tank: Some(tank),
        },
        None => WaterResponse {
            message: WATER_UNAVAILABLE.to_string(),
            distance: None,
            tank: None,
        },
    };
    Ok(Json(response))
}
