//! Store ports over the REST client.
//!
//! Layout:
//! - `relays/{relay1..4}`: raw levels, booleans or `0`/`1`
//! - `sensors`: object with the snapshot leaves
//! - `timers/{relay1..4}`: `{relayKey, endTime, duration, action, createdAt}`
//! - `settings/{userId}`: preference document

use std::collections::HashMap;
use std::future::Future;

use relayhub_app::ports::{RelayStore, SensorSource, SettingsRepository, TimerRepository};
use relayhub_domain::device::{Device, StoredLevel};
use relayhub_domain::error::RelayHubError;
use relayhub_domain::sensor::SensorSnapshot;
use relayhub_domain::settings::UserSettings;
use relayhub_domain::timer::Timer;

use crate::client::{RtdbClient, decode};

const RELAYS: &str = "relays";
const SENSORS: &str = "sensors";
const TIMERS: &str = "timers";

fn relay_path(device: Device) -> String {
    format!("{RELAYS}/{}", device.relay_key())
}

fn timer_path(device: Device) -> String {
    format!("{TIMERS}/{}", device.relay_key())
}

fn settings_path(user_id: &str) -> String {
    format!("settings/{user_id}")
}

/// Project the `relays` subtree onto every device, in relay order.
fn relays_from_tree(tree: Option<&HashMap<String, StoredLevel>>) -> Vec<(Device, Option<bool>)> {
    Device::ALL
        .into_iter()
        .map(|device| {
            let level = tree.and_then(|tree| tree.get(device.relay_key()).map(|level| level.0));
            (device, level)
        })
        .collect()
}

/// Decode the `timers` subtree, skipping records that do not parse.
fn timers_from_tree(tree: HashMap<String, serde_json::Value>) -> Vec<Timer> {
    let mut timers: Vec<Timer> = tree
        .into_iter()
        .filter_map(|(key, value)| {
            let path = format!("{TIMERS}/{key}");
            match decode::<Timer>(&path, value) {
                Ok(timer) => timer,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed timer record");
                    None
                }
            }
        })
        .collect();
    timers.sort_by_key(Timer::device);
    timers
}

/// Whether a raw timer record is the one created at `created_at`.
fn is_record_created_at(record: &serde_json::Value, created_at: i64) -> bool {
    record.get("createdAt").and_then(serde_json::Value::as_i64) == Some(created_at)
}

/// Every store port backed by one Realtime Database.
#[derive(Debug, Clone)]
pub struct RtdbStore {
    client: RtdbClient,
}

impl RtdbStore {
    #[must_use]
    pub fn new(client: RtdbClient) -> Self {
        Self { client }
    }
}

impl RelayStore for RtdbStore {
    fn read(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<bool>, RelayHubError>> + Send {
        let client = self.client.clone();
        async move {
            let level = client.get::<StoredLevel>(&relay_path(device)).await?;
            Ok(level.map(|level| level.0))
        }
    }

    fn read_all(
        &self,
    ) -> impl Future<Output = Result<Vec<(Device, Option<bool>)>, RelayHubError>> + Send {
        let client = self.client.clone();
        async move {
            let tree = client.get::<HashMap<String, StoredLevel>>(RELAYS).await?;
            Ok(relays_from_tree(tree.as_ref()))
        }
    }

    fn write(
        &self,
        device: Device,
        level: bool,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        let client = self.client.clone();
        async move { Ok(client.put(&relay_path(device), &level).await?) }
    }
}

impl SensorSource for RtdbStore {
    fn snapshot(&self) -> impl Future<Output = Result<Option<SensorSnapshot>, RelayHubError>> + Send {
        let client = self.client.clone();
        async move { Ok(client.get::<SensorSnapshot>(SENSORS).await?) }
    }
}

impl TimerRepository for RtdbStore {
    fn put(&self, timer: Timer) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        let client = self.client.clone();
        async move { Ok(client.put(&timer_path(timer.device()), &timer).await?) }
    }

    fn get(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Option<Timer>, RelayHubError>> + Send {
        let client = self.client.clone();
        async move { Ok(client.get::<Timer>(&timer_path(device)).await?) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Timer>, RelayHubError>> + Send {
        let client = self.client.clone();
        async move {
            let tree = client
                .get::<HashMap<String, serde_json::Value>>(TIMERS)
                .await?;
            Ok(tree.map(timers_from_tree).unwrap_or_default())
        }
    }

    fn delete(&self, device: Device) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        let client = self.client.clone();
        async move {
            let path = timer_path(device);
            let existed = client.get::<serde_json::Value>(&path).await?.is_some();
            if existed {
                client.delete(&path).await?;
            }
            Ok(existed)
        }
    }

    fn delete_if(
        &self,
        device: Device,
        created_at: i64,
    ) -> impl Future<Output = Result<bool, RelayHubError>> + Send {
        let client = self.client.clone();
        async move {
            let path = timer_path(device);
            let (record, etag) = client.get_tagged::<serde_json::Value>(&path).await?;
            if !record.is_some_and(|record| is_record_created_at(&record, created_at)) {
                return Ok(false);
            }
            match etag {
                Some(etag) => Ok(client.delete_if_match(&path, &etag).await?),
                None => {
                    client.delete(&path).await?;
                    Ok(true)
                }
            }
        }
    }
}

impl SettingsRepository for RtdbStore {
    fn get(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserSettings>, RelayHubError>> + Send {
        let client = self.client.clone();
        let path = settings_path(user_id);
        async move { Ok(client.get::<UserSettings>(&path).await?) }
    }

    fn put(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        let client = self.client.clone();
        let path = settings_path(user_id);
        let settings = settings.clone();
        async move { Ok(client.put(&path, &settings).await?) }
    }
}
