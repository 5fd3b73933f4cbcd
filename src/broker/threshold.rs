//! Threshold evaluation
//!
//! Each metric has four ascending bounds splitting its range into five
//! states: below `warn_min` is critical, below `good_min` a warning, up to
//! `good_max` good, up to `warn_max` a warning again, above that critical.

use serde::{Deserialize, Serialize};

use super::message::DeviceLog;
use crate::utils::error::HubError;

/// Metrics a threshold can be set for.
pub const METRICS: [&str; 4] = ["temperature", "humidity", "pressure", "airquality"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub metric: String,
    pub warn_min: f64,
    pub good_min: f64,
    pub good_max: f64,
    pub warn_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdState {
    CriticalLow,
    WarningLow,
    Good,
    WarningHigh,
    CriticalHigh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdEvaluation {
    pub metric: String,
    pub value: f64,
    pub state: ThresholdState,
}

impl Threshold {
    /// Classify `value` against this threshold's bounds.
    pub fn state_of(&self, value: f64) -> ThresholdState {
        if value < self.warn_min {
            ThresholdState::CriticalLow
        } else if value < self.good_min {
            ThresholdState::WarningLow
        } else if value <= self.good_max {
            ThresholdState::Good
        } else if value <= self.warn_max {
            ThresholdState::WarningHigh
        } else {
            ThresholdState::CriticalHigh
        }
    }

    pub fn evaluate(&self, value: f64) -> ThresholdEvaluation {
        ThresholdEvaluation {
            metric: self.metric.clone(),
            value,
            state: self.state_of(value),
        }
    }
}

/// The reading of `metric` in `log`.
pub fn metric_value(log: &DeviceLog, metric: &str) -> Result<f64, HubError> {
    match metric {
        "temperature" => Ok(log.temperature),
        "humidity" => Ok(log.humidity),
        "pressure" => Ok(log.pressure),
        "airquality" => Ok(f64::from(log.air_quality)),
        other => Err(HubError::UnknownMetric(other.to_string())),
    }
}

/// Evaluate every threshold against `log`.
pub fn evaluate_log<'a>(
    log: &DeviceLog,
    thresholds: impl IntoIterator<Item = &'a Threshold>,
) -> Result<Vec<ThresholdEvaluation>, HubError> {
    thresholds
        .into_iter()
        .map(|t| Ok(t.evaluate(metric_value(log, &t.metric)?)))
        .collect()
}
