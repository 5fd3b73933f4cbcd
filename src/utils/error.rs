//! The `error` module defines the error type shared by the connection
//! registry, the topic index and the broadcast path.

use thiserror::Error;

use crate::client::ConnectionId;

#[derive(Debug, Error)]
pub enum HubError {
    /// No live connection is registered for the client id.
    #[error("Could not find socket for clientId: {0}")]
    SocketNotFound(String),

    /// The connection is not registered (closed, evicted or never opened).
    #[error("Could not find clientId for socket: {0}")]
    ClientIdNotFound(ConnectionId),

    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HubError {
    /// True for lookup failures, which callers treat as "client is offline".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SocketNotFound(_) | Self::ClientIdNotFound(_))
    }
}
