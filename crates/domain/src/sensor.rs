//! Sensor snapshot and derived water tank status.
//!
//! The snapshot is a read-only projection of values reported by the
//! microcontroller. Nothing in the system mutates it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::deserialize_level;

/// Last values reported under `sensors/*`.
///
/// Numeric readings are optional because a freshly provisioned board may not
/// have published every leaf yet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSnapshot {
    /// Ultrasonic distance from the sensor to the water surface, in cm.
    pub distance: Option<f64>,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub power: Option<f64>,
    #[serde(deserialize_with = "deserialize_level")]
    pub flame: bool,
    #[serde(deserialize_with = "deserialize_level")]
    pub motion: bool,
    /// Board-side timestamp as published, epoch milliseconds.
    pub timestamp: Option<i64>,
}

impl SensorSnapshot {
    /// Water tank status derived from the distance reading, if any.
    #[must_use]
    pub fn water_tank(&self) -> Option<WaterTankStatus> {
        self.distance.map(WaterTankStatus::from_distance)
    }
}

/// Band of the water distance lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterLevel {
    Overflow,
    Full,
    Normal,
    Low,
    Empty,
}

impl WaterLevel {
    /// Lowercase status name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overflow => "overflow",
            Self::Full => "full",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Empty => "empty",
        }
    }

    /// Capitalised label used in replies.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Overflow => "Overflow",
            Self::Full => "Full",
            Self::Normal => "Normal",
            Self::Low => "Low",
            Self::Empty => "Empty",
        }
    }
}

impl fmt::Display for WaterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour tag attached to each band for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterColor {
    Red,
    Green,
    Blue,
    Yellow,
}

/// Percentage, level and colour for one distance reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterTankStatus {
    pub percentage: u8,
    pub level: WaterLevel,
    pub color: WaterColor,
}

/// `(upper bound in cm, percentage, level, colour)`, upper bound inclusive.
const WATER_BANDS: [(f64, u8, WaterLevel, WaterColor); 5] = [
    (5.0, 95, WaterLevel::Overflow, WaterColor::Red),
    (10.0, 85, WaterLevel::Full, WaterColor::Green),
    (20.0, 70, WaterLevel::Normal, WaterColor::Blue),
    (35.0, 45, WaterLevel::Normal, WaterColor::Blue),
    (45.0, 20, WaterLevel::Low, WaterColor::Yellow),
];

impl WaterTankStatus {
    /// Map a surface distance onto the fixed band table.
    ///
    /// Anything beyond the last band is `Empty` at 5%.
    #[must_use]
    pub fn from_distance(distance: f64) -> Self {
        WATER_BANDS
            .iter()
            .find(|(upper, ..)| distance <= *upper)
            .map_or(
                Self {
                    percentage: 5,
                    level: WaterLevel::Empty,
                    color: WaterColor::Red,
                },
                |&(_, percentage, level, color)| Self {
                    percentage,
                    level,
                    color,
                },
            )
    }
}

/// One-line water tank answer for a distance reading.
#[must_use]
pub fn describe_water(distance: f64) -> String {
    let status = WaterTankStatus::from_distance(distance);
    format!(
        "Water tank is {} ({}% full, distance: {distance:.1}cm from surface).",
        status.level.label(),
        status.percentage
    )
}

/// Multi-line system status block for a snapshot.
#[must_use]
pub fn describe_system(snapshot: &SensorSnapshot) -> String {
    let flame = if snapshot.flame {
        "🔥 FIRE DETECTED!"
    } else {
        "✓ Safe"
    };
    let motion = if snapshot.motion {
        "👤 Motion detected"
    } else {
        "✓ No motion"
    };
    format!(
        "Current system status:\n\n\
         * Voltage: {}V\n\
         * Current: {}A\n\
         * Power: {}W\n\
         * Flame sensor: {flame}\n\
         * Motion sensor: {motion}\n\
         * Water distance: {}cm",
        one_decimal(snapshot.voltage),
        one_decimal(snapshot.current),
        one_decimal(snapshot.power),
        one_decimal(snapshot.distance),
    )
}

fn one_decimal(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_decode_numeric_flame_and_motion_flags() {
        let snapshot: SensorSnapshot =
            serde_json::from_str(r#"{"distance": 30, "flame": 1, "motion": 0}"#).unwrap();
        assert_eq!(snapshot.distance, Some(30.0));
        assert!(snapshot.flame);
        assert!(!snapshot.motion);

        let empty: SensorSnapshot = serde_json::from_str("{}").unwrap();
        assert!(!empty.flame);
    }

    #[test]
    fn should_classify_water_bands_inclusive_on_upper_bound() {
        let cases = [
            (5.0, 95, WaterLevel::Overflow),
            (10.0, 85, WaterLevel::Full),
            (20.0, 70, WaterLevel::Normal),
            (35.0, 45, WaterLevel::Normal),
            (45.0, 20, WaterLevel::Low),
            (46.0, 5, WaterLevel::Empty),
        ];
        for (distance, pct, level) in cases {
            let status = WaterTankStatus::from_distance(distance);
            assert_eq!(status.percentage, pct, "distance {distance}");
            assert_eq!(status.level, level, "distance {distance}");
        }
    }

    #[test]
    fn should_use_next_band_when_just_above_bound() {
        let status = WaterTankStatus::from_distance(5.1);
        assert_eq!(status.level, WaterLevel::Full);
        assert_eq!(status.color, WaterColor::Green);
    }

    #[test]
    fn should_color_extremes_red() {
        assert_eq!(WaterTankStatus::from_distance(0.0).color, WaterColor::Red);
        assert_eq!(WaterTankStatus::from_distance(120.0).color, WaterColor::Red);
        assert_eq!(WaterTankStatus::from_distance(40.0).color, WaterColor::Yellow);
    }

    #[test]
    fn should_describe_water_with_one_decimal_distance() {
        assert_eq!(
            describe_water(12.34),
            "Water tank is Normal (70% full, distance: 12.3cm from surface)."
        );
    }

    #[test]
    fn should_describe_system_with_na_when_values_missing() {
        let snapshot = SensorSnapshot {
            voltage: Some(229.96),
            flame: true,
            ..SensorSnapshot::default()
        };
        let text = describe_system(&snapshot);
        assert!(text.starts_with("Current system status:\n\n"));
        assert!(text.contains("* Voltage: 230.0V"));
        assert!(text.contains("* Current: N/AA"));
        assert!(text.contains("* Flame sensor: 🔥 FIRE DETECTED!"));
        assert!(text.contains("* Motion sensor: ✓ No motion"));
        assert!(text.ends_with("* Water distance: N/Acm"));
    }

    #[test]
    fn should_deserialize_partial_snapshot() {
        let snapshot: SensorSnapshot =
            serde_json::from_str(r#"{"distance": 18.5, "motion": true}"#).unwrap();
        assert_eq!(snapshot.distance, Some(18.5));
        assert!(snapshot.motion);
        assert!(!snapshot.flame);
        assert_eq!(snapshot.voltage, None);
        assert_eq!(
            snapshot.water_tank().map(|s| s.level),
            Some(WaterLevel::Normal)
        );
    }
}
