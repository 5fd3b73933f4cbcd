//! Dashboard publisher
//!
//! Keeps a bounded window of the most recent device readings and pushes
//! dashboard events to every member of the `Dashboard` topic. The window and
//! the threshold set are process memory only; both are empty after a restart.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::engine::ConnectionManager;
use super::message::{DASHBOARD, DashboardEvent, DeviceLog, Measurement};
use super::threshold::{METRICS, Threshold, evaluate_log};
use crate::utils::error::HubError;

/// Unit reported for every stored temperature.
const TEMPERATURE_UNIT: &str = "Celsius";

#[derive(Debug)]
pub struct DashboardPublisher {
    manager: Arc<ConnectionManager>,
    recent: Mutex<VecDeque<DeviceLog>>,
    capacity: usize,
    thresholds: RwLock<BTreeMap<String, Threshold>>,
}

impl DashboardPublisher {
    pub fn new(manager: Arc<ConnectionManager>, capacity: usize) -> Self {
        Self {
            manager,
            recent: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            thresholds: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store `reading` and broadcast the whole recent window to dashboards.
    /// Returns the number of dashboards reached.
    pub fn record_measurement(&self, reading: Measurement) -> Result<usize, HubError> {
        let log = DeviceLog {
            id: Uuid::new_v4().to_string(),
            device_id: reading.device_id,
            unit: TEMPERATURE_UNIT.to_string(),
            timestamp: chrono::Utc::now(),
            temperature: reading.temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
            air_quality: reading.air_quality,
        };
        debug!(device_id = %log.device_id, "Recorded device log {}", log.id);

        let logs = {
            let mut recent = self.recent.lock();
            if self.capacity == 0 {
                recent.clear();
            } else {
                while recent.len() >= self.capacity {
                    recent.pop_front();
                }
                recent.push_back(log);
            }
            recent.iter().cloned().collect()
        };

        self.manager.broadcast_to_topic(
            DASHBOARD,
            &DashboardEvent::ServerBroadcastsLiveDataToDashboard { logs },
        )
    }

    /// Drop every stored reading and tell dashboards to clear their views.
    pub fn clear_data(&self) -> Result<usize, HubError> {
        let dropped = {
            let mut recent = self.recent.lock();
            let n = recent.len();
            recent.clear();
            n
        };
        info!(dropped, "Cleared recent device logs");
        self.manager
            .broadcast_to_topic(DASHBOARD, &DashboardEvent::AdminHasDeletedData)
    }

    /// Announce a new device reporting interval, in seconds.
    pub fn change_interval(&self, interval: u32) -> Result<usize, HubError> {
        info!(interval, "Device reporting interval changed");
        self.manager.broadcast_to_topic(
            DASHBOARD,
            &DashboardEvent::ServerBroadcastsIntervalChange { interval },
        )
    }

    /// The stored window, oldest first.
    pub fn recent_logs(&self) -> Vec<DeviceLog> {
        self.recent.lock().iter().cloned().collect()
    }

    /// Replace the thresholds named in `updates` and broadcast the full set,
    /// scored against the latest reading when there is one.
    ///
    /// An unknown metric rejects the whole batch and nothing is stored.
    pub fn update_thresholds(&self, updates: Vec<Threshold>) -> Result<usize, HubError> {
        if let Some(bad) = updates.iter().find(|t| !METRICS.contains(&t.metric.as_str())) {
            return Err(HubError::UnknownMetric(bad.metric.clone()));
        }

        let updated_thresholds: Vec<Threshold> = {
            let mut thresholds = self.thresholds.write();
            for threshold in updates {
                thresholds.insert(threshold.metric.clone(), threshold);
            }
            thresholds.values().cloned().collect()
        };
        info!(count = updated_thresholds.len(), "Thresholds updated");

        let latest = self.recent.lock().back().cloned();
        let evaluations = match latest {
            Some(log) => evaluate_log(&log, &updated_thresholds)?,
            None => Vec::new(),
        };

        self.manager.broadcast_to_topic(
            DASHBOARD,
            &DashboardEvent::ThresholdsBroadcast {
                updated_thresholds,
                evaluations,
            },
        )
    }

    /// Current thresholds, ordered by metric name.
    pub fn thresholds(&self) -> Vec<Threshold> {
        self.thresholds.read().values().cloned().collect()
    }
}
