//! Time and timestamp helpers.
//!
//! Stored records carry epoch milliseconds (the wire format of the remote
//! store); in-process code works with [`Timestamp`].

use chrono::{DateTime, Utc};

/// UTC timestamp used for timer deadlines, sensor readings, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert a timestamp to epoch milliseconds.
#[must_use]
pub fn to_millis(ts: Timestamp) -> i64 {
    ts.timestamp_millis()
}

/// Convert epoch milliseconds back into a timestamp.
///
/// Out-of-range values clamp to the Unix epoch.
#[must_use]
pub fn from_millis(millis: i64) -> Timestamp {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
