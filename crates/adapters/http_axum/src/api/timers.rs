//! JSON handlers for per-device timers.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use relayhub_app::ports::{
    LanguageModel, RelayStore, SensorSource, SettingsRepository, TimerRepository,
};
use relayhub_app::services::timer_scheduler::ActiveTimer;
use relayhub_domain::device::Device;
use relayhub_domain::error::{NotFoundError, RelayHubError};
use relayhub_domain::timer::{TimerAction, TimerDuration, format_clock};

use super::{DeleteResponse, parse_device};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for scheduling a timer. Missing parts count as zero.
#[derive(Deserialize)]
pub struct SetTimerRequest {
    #[serde(default)]
    pub hours: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
    pub action: TimerAction,
}

#[derive(Debug, Serialize)]
pub struct TimerView {
    pub device: Device,
    pub relay_key: &'static str,
    pub action: TimerAction,
    /// Deadline, epoch milliseconds.
    pub end_time: i64,
    /// Original duration in seconds.
    pub duration: u64,
    pub remaining_seconds: u64,
    /// Countdown as `MM:SS` or `HH:MM:SS`.
    pub remaining: String,
}

impl From<ActiveTimer> for TimerView {
    fn from(active: ActiveTimer) -> Self {
        let device = active.timer.device();
        Self {
            device,
            relay_key: device.relay_key(),
            action: active.timer.action,
            end_time: active.timer.end_time,
            duration: active.timer.duration,
            remaining: active.remaining_clock(),
            remaining_seconds: active.remaining_seconds,
        }
    }
}

/// `GET /api/timers`
pub async fn list<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
) -> Result<Json<Vec<TimerView>>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let timers = state.scheduler.active_timers().await?;
    Ok(Json(timers.into_iter().map(TimerView::from).collect()))
}

/// `PUT /api/timers/:device`
pub async fn set<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Path(device): Path<String>,
    Json(req): Json<SetTimerRequest>,
) -> Result<Json<TimerView>, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let device = parse_device(&device)?;
    let duration = TimerDuration::new(req.hours, req.minutes, req.seconds);
    let timer = state
        .scheduler
        .set_timer(device, duration, req.action)
        .await?;
    Ok(Json(TimerView {
        device,
        relay_key: device.relay_key(),
        action: timer.action,
        end_time: timer.end_time,
        duration: timer.duration,
        remaining_seconds: timer.duration,
        remaining: format_clock(timer.duration),
    }))
}

/// `DELETE /api/timers/:device`
pub async fn cancel<T, S, Z, R, M>(
    State(state): State<AppState<T, S, Z, R, M>>,
    Path(device): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Send + Sync + 'static,
    Z: SensorSource + Send + Sync + 'static,
    R: SettingsRepository + Send + Sync + 'static,
    M: LanguageModel + Send + Sync + 'static,
{
    let device = parse_device(&device)?;
    if state.scheduler.cancel_timer(device).await? {
        Ok(DeleteResponse::NoContent)
    } else {
        Err(RelayHubError::from(NotFoundError {
            entity: "Timer",
            id: device.relay_key().to_string(),
        })
        .into())
    }
}
