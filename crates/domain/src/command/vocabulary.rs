//! Keyword tables shared by the command rules.
//!
//! Matching is plain substring search on the lowercased input. English and
//! Hinglish phrasings live side by side.

use crate::device::Device;

pub const ON_WORDS: &[&str] = &["on", "chalu", "jala", "start"];
pub const OFF_WORDS: &[&str] = &["off", "band", "bujha", "stop"];

pub const GROUP_WORD: &str = "sab";
pub const GROUP_OFF_WORD: &str = "band";
pub const GROUP_ON_WORDS: &[&str] = &["on", "chalu"];

pub const BOTH_LIGHTS: &[&str] = &["all lights", "both lights", "dono light"];

pub const WATER_WORDS: &[&str] = &["pani", "water", "tank"];
pub const STATUS_WORDS: &[&str] = &["status", "sensor", "system"];

pub const TIMED_MARKERS: &[&str] = &["for ", "after "];
pub const TIMER_WORD: &str = "timer";
pub const TIMER_QUERY_WORDS: &[&str] = &["status", "active", "what", "check"];
pub const CANCEL_WORD: &str = "cancel";

const LIGHT2: &[&str] = &["light 2", "second light", "dusri light"];
const LIGHT1: &[&str] = &["light 1", "first light", "pehli light"];
const FAN: &[&str] = &["fan", "pankha"];
const EXTRA: &[&str] = &["extra", "relay 4", "device 4"];

/// Device keyword table, checked top to bottom.
///
/// Light 2 precedes light 1 so the generic `light` fallback never steals a
/// light 2 phrase.
const DEVICE_TABLE: &[(Device, &[&str])] = &[
    (Device::Light2, LIGHT2),
    (Device::Light1, LIGHT1),
    (Device::Fan, FAN),
    (Device::Extra, EXTRA),
];

/// True if `text` contains any of `words`.
#[must_use]
pub fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Explicit light 2 phrasing.
#[must_use]
pub fn mentions_light2(text: &str) -> bool {
    contains_any(text, LIGHT2)
}

/// Explicit light 1 phrasing, or a bare `light` that is not light 2.
#[must_use]
pub fn mentions_light1(text: &str) -> bool {
    contains_any(text, LIGHT1) || (text.contains("light") && !mentions_light2(text))
}

#[must_use]
pub fn mentions_fan(text: &str) -> bool {
    contains_any(text, FAN)
}

#[must_use]
pub fn mentions_extra(text: &str) -> bool {
    contains_any(text, EXTRA)
}

/// Resolve the single device a phrase refers to.
///
/// `text` must already be lowercased.
#[must_use]
pub fn find_device(text: &str) -> Option<Device> {
    DEVICE_TABLE
        .iter()
        .find(|(_, words)| contains_any(text, words))
        .map(|(device, _)| *device)
        .or_else(|| (text.contains("light") && !mentions_light2(text)).then_some(Device::Light1))
}
