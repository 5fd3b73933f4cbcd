//! Connection handles
//!
//! `WsConnection` holds the sending side of a per-socket channel. The
//! transport spawns a writer task that drains the channel into the socket, so
//! `send` only enqueues and never waits on the network.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::utils::error::HubError;

/// Transport-assigned identity of one physical socket.
pub type ConnectionId = Uuid;

/// A live bidirectional endpoint the broker can push text frames to.
pub trait Connection: Send + Sync + fmt::Debug {
    /// Identity of this physical connection. Only used to tell connections
    /// apart, never as an application key.
    fn id(&self) -> ConnectionId;

    /// Whether the transport believes the socket can accept sends right now.
    fn is_available(&self) -> bool;

    fn send(&self, text: String) -> Result<(), HubError>;
}

pub type SharedConnection = Arc<dyn Connection>;

#[derive(Debug)]
pub struct WsConnection {
    id: ConnectionId,
    sender: UnboundedSender<WsMessage>,
    open: AtomicBool,
}

impl WsConnection {
    /// Create a connection around a writer channel with a fresh identity.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            open: AtomicBool::new(true),
        }
    }

    /// Called by the transport once the socket's writer has stopped.
    pub fn mark_closed(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

impl Connection for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_available(&self) -> bool {
        self.open.load(Ordering::SeqCst) && !self.sender.is_closed()
    }

    fn send(&self, text: String) -> Result<(), HubError> {
        self.sender
            .send(WsMessage::text(text))
            .map_err(|_| HubError::ConnectionClosed(self.id))
    }
}
