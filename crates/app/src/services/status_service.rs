//! Status service: water tank and system status answers.
//!
//! These answers never fail: a missing snapshot or a failed read turns into
//! a short "unavailable" sentence.

use relayhub_domain::error::RelayHubError;
use relayhub_domain::sensor::{self, SensorSnapshot, WaterTankStatus};

use crate::ports::SensorSource;

pub const WATER_UNAVAILABLE: &str = "Water level data unavailable.";
pub const WATER_READ_FAILED: &str = "Unable to fetch water tank data.";
pub const SENSORS_UNAVAILABLE: &str = "Sensor data unavailable.";
pub const SENSORS_READ_FAILED: &str = "Unable to fetch sensor data.";

#[derive(Debug, Clone)]
pub struct StatusService<S> {
    sensors: S,
}

impl<S: SensorSource> StatusService<S> {
    pub fn new(sensors: S) -> Self {
        Self { sensors }
    }

    /// Latest sensor snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the sensor source.
    pub async fn snapshot(&self) -> Result<Option<SensorSnapshot>, RelayHubError> {
        self.sensors.snapshot().await
    }

    /// Water tank band for the latest distance reading.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the sensor source.
    pub async fn water_tank(&self) -> Result<Option<(f64, WaterTankStatus)>, RelayHubError> {
        let snapshot = self.sensors.snapshot().await?;
        Ok(snapshot
            .and_then(|s| s.distance)
            .map(|d| (d, WaterTankStatus::from_distance(d))))
    }

    /// One-line water tank answer.
    #[tracing::instrument(skip(self))]
    pub async fn water_status(&self) -> String {
        match self.water_tank().await {
            Ok(Some((distance, _))) => sensor::describe_water(distance),
            Ok(None) => WATER_UNAVAILABLE.to_string(),
            Err(err) => {
                tracing::error!(error = %err, "failed to read water level");
                WATER_READ_FAILED.to_string()
            }
        }
    }

    /// Multi-line system status answer.
    #[tracing::instrument(skip(self))]
    pub async fn system_status(&self) -> String {
        match self.sensors.snapshot().await {
            Ok(Some(snapshot)) => sensor::describe_system(&snapshot),
            Ok(None) => SENSORS_UNAVAILABLE.to_string(),
            Err(err) => {
                tracing::error!(error = %err, "failed to read sensors");
                SENSORS_READ_FAILED.to_string()
            }
        }
    }
}
