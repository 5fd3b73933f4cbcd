use serde::{Deserialize, Serialize};

use crate::broker::message::Measurement;
use crate::broker::threshold::Threshold;

/// Frames a connected client may send.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "subscribe")]
    Subscribe { topics: Vec<String> },

    #[serde(rename = "unsubscribe")]
    Unsubscribe { topics: Vec<String> },

    /// A device reporting a reading.
    #[serde(rename = "measurement")]
    Measurement(Measurement),

    #[serde(rename = "clear_data")]
    ClearData,

    #[serde(rename = "change_interval")]
    ChangeInterval { interval: u32 },

    #[serde(rename = "update_thresholds")]
    UpdateThresholds { thresholds: Vec<Threshold> },
}

/// Direct replies to the socket that sent a `ClientMessage`.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "subscribed")]
    Subscribed { topics: Vec<String> },

    #[serde(rename = "unsubscribed")]
    Unsubscribed { topics: Vec<String> },

    #[serde(rename = "error")]
    Error { message: String },
}
