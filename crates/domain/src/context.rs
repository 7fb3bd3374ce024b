//! Home status context handed to the language model.
//!
//! The block is prepended to free-form questions so the model can answer
//! "is the fan on?" style prompts from live data.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::device::{Device, RelayState};
use crate::sensor::{SensorSnapshot, WaterTankStatus};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

static CASUAL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(hi|hello|hey|thanks|thank you|ok|okay|bye|goodbye|yes|no|cool|nice|great|awesome)\s*[!.?]*$",
    )
    .ok()
});

/// Greetings and one-word acknowledgements skip the status block.
#[must_use]
pub fn is_casual(message: &str) -> bool {
    CASUAL
        .as_ref()
        .is_some_and(|re| re.is_match(message.trim()))
}

/// Render the home status block from relay states and a sensor snapshot.
#[must_use]
pub fn home_status(relays: &[(Device, RelayState)], sensors: &SensorSnapshot) -> String {
    let distance = sensors.distance.unwrap_or(0.0);
    let tank = WaterTankStatus::from_distance(distance);

    let mut out = String::new();
    let _ = writeln!(out, "CURRENT SMART HOME STATUS:\n{RULE}\n");
    let _ = writeln!(out, "🏠 DEVICES:");
    for device in Device::ALL {
        let on = relays
            .iter()
            .find(|(d, _)| *d == device)
            .is_some_and(|(_, state)| state.is_on());
        let label = if on { "🟢 ON" } else { "⚫ OFF" };
        let _ = writeln!(out, "  • {}: {label}", device.display_name());
    }
    let _ = writeln!(out, "\n💧 WATER TANK:");
    let _ = writeln!(out, "  • Status: {}", tank.level.label());
    let _ = writeln!(out, "  • Level: {}% full", tank.percentage);
    let _ = writeln!(out, "  • Distance to water: {distance:.1}cm");
    let _ = writeln!(out, "\n⚡ ELECTRICITY:");
    let _ = writeln!(out, "  • Voltage: {}V", reading(sensors.voltage));
    let _ = writeln!(out, "  • Current: {}A", reading(sensors.current));
    let _ = writeln!(out, "  • Power: {}W", reading(sensors.power));
    let _ = writeln!(out, "\n🛡️ SECURITY:");
    let flame = if sensors.flame {
        "🔥 FIRE DETECTED!"
    } else {
        "✅ Safe"
    };
    let motion = if sensors.motion {
        "👤 Motion Detected"
    } else {
        "✅ No Motion"
    };
    let _ = writeln!(out, "  • Flame Sensor: {flame}");
    let _ = writeln!(out, "  • Motion Sensor: {motion}");
    let _ = writeln!(out, "\n{RULE}\n");
    out.push_str("Use this information to answer the user's question accurately.\n");
    out.push_str("If they ask about device status, refer to the data above.\n");
    out.push_str(
        "If they want to control devices, politely tell them to use commands like \"turn on light 1\".\n",
    );
    out
}

/// Prefix `message` with the status block.
#[must_use]
pub fn contextual_prompt(context: &str, message: &str) -> String {
    if context.is_empty() {
        message.to_string()
    } else {
        format!("{context}\n\nUser Question: {message}")
    }
}

fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"))
}
