//! Device: the four fixed relay-driven actuators.
//!
//! The set of devices is static: two lights, a fan and an extra outlet,
//! each wired to one relay channel (`relay1`..`relay4`). Nothing creates or
//! destroys devices at runtime.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// One of the four logical actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Light1,
    Light2,
    Fan,
    Extra,
}

impl Device {
    /// Every device, in relay order.
    pub const ALL: [Self; 4] = [Self::Light1, Self::Light2, Self::Fan, Self::Extra];

    /// Devices switched by the "everything on" group command.
    ///
    /// The extra outlet is left alone when switching everything on.
    pub const LIGHTS_AND_FAN: [Self; 3] = [Self::Light1, Self::Light2, Self::Fan];

    /// Both light channels.
    pub const LIGHTS: [Self; 2] = [Self::Light1, Self::Light2];

    /// Stable identifier (`light1`, `light2`, `fan`, `extra`).
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Light1 => "light1",
            Self::Light2 => "light2",
            Self::Fan => "fan",
            Self::Extra => "extra",
        }
    }

    /// Physical relay channel key used in store paths.
    #[must_use]
    pub fn relay_key(self) -> &'static str {
        match self {
            Self::Light1 => "relay1",
            Self::Light2 => "relay2",
            Self::Fan => "relay3",
            Self::Extra => "relay4",
        }
    }

    /// Human-readable name used in replies.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Light1 => "Light 1",
            Self::Light2 => "Light 2",
            Self::Fan => "Fan",
            Self::Extra => "Extra Device",
        }
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Light1 | Self::Light2 => "💡",
            Self::Fan => "🌀",
            Self::Extra => "🔌",
        }
    }

    /// Resolve a relay channel key back into its device.
    #[must_use]
    pub fn from_relay_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.relay_key() == key)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Device {
    type Err = ValidationError;

    /// Accepts either the device id (`fan`) or its relay key (`relay3`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.id() == needle || d.relay_key() == needle)
            .ok_or(ValidationError::UnknownDevice(s.to_string()))
    }
}

/// Electrical convention of the relay board.
///
/// With [`ActiveLow`](Self::ActiveLow) a stored `false` means the relay is
/// energised, i.e. the device is logically ON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    #[must_use]
    pub fn from_active_low(active_low: bool) -> Self {
        if active_low {
            Self::ActiveLow
        } else {
            Self::ActiveHigh
        }
    }

    /// Stored level for a logical on/off state.
    #[must_use]
    pub fn to_stored(self, on: bool) -> bool {
        match self {
            Self::ActiveLow => !on,
            Self::ActiveHigh => on,
        }
    }

    /// Logical on/off state for a stored level.
    #[must_use]
    pub fn is_on(self, stored: bool) -> bool {
        self.to_stored(stored)
    }
}

/// A relay or sensor level as the board writes it.
///
/// Firmware publishes either a boolean or a number; any non-zero number reads
/// as `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StoredLevel(pub bool);

impl<'de> Deserialize<'de> for StoredLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_level(deserializer).map(Self)
    }
}

/// `deserialize_with` helper for boolean leaves that may arrive as `0`/`1`.
///
/// A JSON `null` reads as `false`.
///
/// # Errors
///
/// Fails for strings, arrays and objects.
pub fn deserialize_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    deserializer.deserialize_any(LevelVisitor)
}

struct LevelVisitor;

impl Visitor<'_> for LevelVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean or a numeric level")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
        Ok(v.abs() > 0.0)
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }
}

/// Logical state of a relay as reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayState {
    On,
    Off,
    /// No value has been stored for the relay yet.
    Unknown,
}

impl RelayState {
    /// Decode an optional stored level through the board polarity.
    #[must_use]
    pub fn from_stored(stored: Option<bool>, polarity: Polarity) -> Self {
        match stored {
            Some(level) if polarity.is_on(level) => Self::On,
            Some(_) => Self::Off,
            None => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}
