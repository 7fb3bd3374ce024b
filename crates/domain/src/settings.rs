//! Per-user preferences stored under `settings/{userId}`.
//!
//! Stored documents may be partial (older clients wrote fewer fields). Every
//! group and field is defaulted, so decoding a partial document merges it
//! over [`UserSettings::default`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSettings {
    pub sensors: SensorSettings,
    pub notifications: NotificationSettings,
    pub automation: AutomationSettings,
    pub energy: EnergySettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensorSettings {
    pub flame_sensor_enabled: bool,
    pub motion_sensor_enabled: bool,
    pub water_sensor_enabled: bool,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            flame_sensor_enabled: true,
            motion_sensor_enabled: true,
            water_sensor_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSettings {
    pub master_enabled: bool,
    pub fire_alerts: bool,
    pub motion_alerts: bool,
    pub timer_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            master_enabled: true,
            fire_alerts: true,
            motion_alerts: true,
            timer_alerts: true,
        }
    }
}

impl NotificationSettings {
    /// Fire alerts require the master switch as well.
    #[must_use]
    pub fn fire_alerts_active(&self) -> bool {
        self.master_enabled && self.fire_alerts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutomationSettings {
    /// Suppresses motion lighting and fire alerts while away.
    pub holiday_mode: bool,
    pub motion_lights_enabled: bool,
    pub motion_auto_off_minutes: u32,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            holiday_mode: false,
            motion_lights_enabled: true,
            motion_auto_off_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnergySettings {
    /// Price per kWh.
    pub unit_price: f64,
    pub billing_cycle_start_day: u32,
}

impl Default for EnergySettings {
    fn default() -> Self {
        Self {
            unit_price: 8.5,
            billing_cycle_start_day: 1,
        }
    }
}

impl UserSettings {
    /// Check value ranges the automation and billing code rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SettingOutOfRange`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=60).contains(&self.automation.motion_auto_off_minutes) {
            return Err(ValidationError::SettingOutOfRange {
                field: "motionAutoOffMinutes",
            });
        }
        if !(1..=28).contains(&self.energy.billing_cycle_start_day) {
            return Err(ValidationError::SettingOutOfRange {
                field: "billingCycleStartDay",
            });
        }
        if !self.energy.unit_price.is_finite() || self.energy.unit_price < 0.0 {
            return Err(ValidationError::SettingOutOfRange { field: "unitPrice" });
        }
        Ok(())
    }

    /// Whether motion should drive the lights.
    #[must_use]
    pub fn motion_lighting_active(&self) -> bool {
        self.sensors.motion_sensor_enabled
            && self.automation.motion_lights_enabled
            && !self.automation.holiday_mode
    }

    /// Whether a flame edge should raise an alert.
    #[must_use]
    pub fn fire_alerting_active(&self) -> bool {
        self.sensors.flame_sensor_enabled
            && !self.automation.holiday_mode
            && self.notifications.fire_alerts_active()
    }
}
