//! JSON handlers for direct relay control.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use relayhub_app::ports::{
    LanguageModel, RelayStore, SensorSource, SettingsRepository, TimerRepository,
};
use relayhub_domain::device::{Device, RelayState};

use super::parse_device;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SwitchRequest {
    pub on: bool,
}

/// One device and its logical state.
#[derive(Debug, Serialize)]
pub struct RelayView {
    pub device: Device,
    pub relay_key: &'static str,
    pub name: &'static str,
    pub state: RelayState,
}

impl RelayView {
    fn new(device: Device, state: RelayState) -> Self {
        Self {
            device,
            relay_key: device.relay_key(),
            name: device.display_name(),
            state,
        }
    }

    fn switched(device: Device, on: bool) -> Self {
        Self::new(device, if on { RelayState::On } else { RelayState::Off })
    }
}

/// `GET /api/relays`
pub async fn list<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
) -> Result<Json<Vec<RelayView>>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let states = state.relays().states().await?;
    Ok(Json(
        states
            .into_iter()
            .map(|(device, state)| RelayView::new(device, state))
            .collect(),
    ))
}

/// `PUT /api/relays/:device`
pub async fn set<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Path(device): Path<String>,
    Json(req): Json<SwitchRequest>,
) -> Result<Json<RelayView>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let device = parse_device(&device)?;
    state.relays().set(device, req.on).await?;
    Ok(Json(RelayView::switched(device, req.on)))
}

/// `POST /api/relays/:device/toggle`
pub async fn toggle<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Path(device): Path<String>,
) -> Result<Json<RelayView>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let device = parse_device(&device)?;
    let on = state.relays().toggle(device).await?;
    Ok(Json(RelayView::switched(device, on)))
}

/// `POST /api/relays/all`
///
/// Off switches all four devices; on switches the lights and the fan.
pub async fn set_all<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Json(req): Json<SwitchRequest>,
) -> Result<Json<Vec<RelayView>>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let relays = state.relays();
    let devices: &[Device] = if req.on {
        relays.turn_all_on().await?;
        &Device::LIGHTS_AND_FAN
    } else {
        relays.turn_all_off().await?;
        &Device::ALL
    };
    Ok(Json(
        devices
            .iter()
            .map(|device| RelayView::switched(*device, req.on))
            .collect(),
    ))
}
