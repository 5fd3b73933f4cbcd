//! Broadcast payloads
//!
//! Everything pushed to a dashboard socket is a JSON object with camelCase
//! field names. Payload types own their naming through
//! `#[serde(rename_all = "camelCase")]`; `camel_case_json` additionally
//! renames the top-level fields of payloads that don't, so a caller's
//! `SensorId` or `sensor_id` goes out as `sensorId`. Nested values are left
//! exactly as they serialize: map keys are data, not field names.
//!
//! The dashboard event envelope carries an `eventType` discriminator next to
//! the payload fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::threshold::{Threshold, ThresholdEvaluation};

/// Topic every live dashboard joins.
pub const DASHBOARD: &str = "Dashboard";

/// Serialize `payload` to JSON text with camelCase top-level field names.
///
/// Fails if two fields collapse onto the same camelCase name.
pub fn camel_case_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    let value = match serde_json::to_value(payload)? {
        Value::Object(fields) => Value::Object(camelize_fields(fields)?),
        other => other,
    };
    serde_json::to_string(&value)
}

fn camelize_fields(fields: Map<String, Value>) -> Result<Map<String, Value>, serde_json::Error> {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        let renamed = to_camel_case(&key);
        if out.contains_key(&renamed) {
            return Err(serde::ser::Error::custom(format!(
                "field `{key}` collides with another field named `{renamed}`"
            )));
        }
        out.insert(renamed, value);
    }
    Ok(out)
}

/// `SensorId` -> `sensorId`, `sensor_id` -> `sensorId`, `ID` -> `id`,
/// `URLValue` -> `urlValue`. Keys already in camelCase are unchanged.
pub fn to_camel_case(key: &str) -> String {
    if key.contains('_') {
        return snake_to_camel(key);
    }

    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len());
    for (i, c) in chars.iter().enumerate() {
        if !c.is_uppercase() {
            out.extend(chars[i..].iter());
            break;
        }
        // Keep the last capital of an acronym when a lowercase word follows it.
        let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
        if i > 0 && next_is_lower {
            out.extend(chars[i..].iter());
            break;
        }
        out.extend(c.to_lowercase());
    }
    out
}

fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, word) in key.split('_').filter(|w| !w.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(&to_camel_case(word));
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// One stored reading from an air-quality device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLog {
    pub id: String,
    pub device_id: String,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub air_quality: i32,
}

/// A raw reading as reported by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub air_quality: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all_fields = "camelCase")]
pub enum DashboardEvent {
    ServerBroadcastsLiveDataToDashboard {
        logs: Vec<DeviceLog>,
    },
    AdminHasDeletedData,
    ServerBroadcastsIntervalChange {
        interval: u32,
    },
    /// Current thresholds and how the latest reading scores against them.
    #[serde(rename = "ThresholdsBroadcastDto")]
    ThresholdsBroadcast {
        updated_thresholds: Vec<Threshold>,
        evaluations: Vec<ThresholdEvaluation>,
    },
}
