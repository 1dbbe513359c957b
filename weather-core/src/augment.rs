//! Best-effort local time enrichment of an upstream payload.
//!
//! Two signals are used, in order:
//! 1. the provider's top-level `timezone` field (seconds east of UTC);
//! 2. a 15-degrees-per-hour estimate from the caller's longitude.
//!
//! The longitude estimate is deliberately crude (no zone boundaries, no DST)
//! and kept exactly as is because callers rely on the formula.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::model::Coordinates;

pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of "now". Lets tests pin the instant enrichment is computed from.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// What was written into the payload, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalTime {
    /// From the provider's `timezone` field.
    Reported {
        local_time: String,
        offset_hours: i64,
    },
    /// Estimated from longitude.
    Estimated {
        local_time: String,
        offset_hours: i64,
    },
}

/// Add `local_time` plus an offset figure to `payload` when a signal exists.
///
/// With a reported offset the figure is stored as `timezone_offset_hours`;
/// with the longitude estimate it is stored as `timezone_offset`. Returns
/// `None` and leaves the payload untouched when neither signal is usable or
/// the payload is not a JSON object.
pub fn augment_local_time(
    payload: &mut Value,
    coords: Option<&Coordinates>,
    now: DateTime<Utc>,
) -> Option<LocalTime> {
    let map = payload.as_object_mut()?;

    if let Some(offset_seconds) = reported_offset_seconds(map) {
        let local_time = format_local(now, Duration::try_seconds(offset_seconds)?)?;
        let offset_hours = offset_seconds / 3600;
        map.insert("local_time".into(), Value::from(local_time.clone()));
        map.insert("timezone_offset_hours".into(), Value::from(offset_hours));
        return Some(LocalTime::Reported {
            local_time,
            offset_hours,
        });
    }

    let (_lat, lng) = coords?.parsed()?;
    let offset_hours = longitude_offset_hours(lng);
    let local_time = format_local(now, Duration::try_hours(offset_hours)?)?;
    map.insert("local_time".into(), Value::from(local_time.clone()));
    map.insert("timezone_offset".into(), Value::from(offset_hours));
    Some(LocalTime::Estimated {
        local_time,
        offset_hours,
    })
}

/// Whole hours east of UTC, `lng / 15` truncated toward zero.
pub fn longitude_offset_hours(lng: f64) -> i64 {
    (lng / 15.0).trunc() as i64
}

fn reported_offset_seconds(map: &Map<String, Value>) -> Option<i64> {
    let value = map.get("timezone")?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

fn format_local(now: DateTime<Utc>, offset: Duration) -> Option<String> {
    let local = now.checked_add_signed(offset)?;
    Some(local.format(LOCAL_TIME_FORMAT).to_string())
}
