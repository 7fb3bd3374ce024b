//! Timer: a deferred on/off action for one device.
//!
//! At most one timer exists per device; setting a new one replaces the old
//! record outright. Records are never mutated, only replaced or removed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::error::ValidationError;
use crate::time::{self, Timestamp};

/// What to do with the device when the timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    On,
    Off,
}

impl TimerAction {
    /// The logical on/off level this action drives the relay to.
    #[must_use]
    pub fn turns_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// An hours/minutes/seconds triple as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerDuration {
    #[serde(default)]
    pub hours: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
}

impl TimerDuration {
    #[must_use]
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    #[must_use]
    pub fn from_secs(total: u64) -> Self {
        Self::new(0, 0, total)
    }

    /// Total length in seconds (`h*3600 + m*60 + s`).
    #[must_use]
    pub fn total_seconds(self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }
}

/// A persisted deferred action.
///
/// Field names follow the stored record layout
/// `{relayKey, endTime, duration, action, createdAt}` (epoch milliseconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    #[serde(with = "relay_key")]
    pub relay_key: Device,
    /// Absolute deadline, epoch milliseconds.
    pub end_time: i64,
    /// Original duration in seconds, kept for display.
    pub duration: u64,
    pub action: TimerAction,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
}

impl Timer {
    /// Build a timer that fires `duration` after `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveDuration`] when the total
    /// duration is zero.
    pub fn schedule(
        device: Device,
        duration: TimerDuration,
        action: TimerAction,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let total = duration.total_seconds();
        if total == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }
        let created_at = time::to_millis(now);
        let span = i64::try_from(total.saturating_mul(1000)).unwrap_or(i64::MAX);
        Ok(Self {
            relay_key: device,
            end_time: created_at.saturating_add(span),
            duration: total,
            action,
            created_at,
        })
    }

    #[must_use]
    pub fn device(&self) -> Device {
        self.relay_key
    }

    /// Whole seconds left before the deadline, floored and clamped at zero.
    #[must_use]
    pub fn remaining_seconds(&self, now: Timestamp) -> u64 {
        let left = self.end_time.saturating_sub(time::to_millis(now));
        u64::try_from(left / 1000).unwrap_or(0)
    }

    /// A timer is due once no whole second remains and the deadline has passed.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.remaining_seconds(now) == 0 && self.end_time <= time::to_millis(now)
    }
}

/// Format seconds as `HH:MM:SS` when at least one hour, otherwise `MM:SS`.
#[must_use]
pub fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Timers are keyed by relay channel in storage.
mod relay_key {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::device::Device;

    pub fn serialize<S: Serializer>(device: &Device, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(device.relay_key())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Device, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
