//! Connection registry
//!
//! Bidirectional mapping between an application client id and the live
//! connection currently serving it. One connection per client id: a second
//! registration for the same id evicts the first (last writer wins). Evicted
//! connections are not closed here; the transport owns their lifecycle.
//!
//! Both directions live behind a single lock so a reader never sees one side
//! of a registration without the other.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::client::{Connection, ConnectionId, SharedConnection};
use crate::utils::error::HubError;

pub type ClientId = String;

#[derive(Debug, Default)]
struct Registrations {
    sockets: HashMap<ClientId, SharedConnection>,
    clients: HashMap<ConnectionId, ClientId>,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<Registrations>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `connection` for `client_id`, returning the connection it
    /// replaced, if any.
    pub(crate) fn register(
        &self,
        connection: SharedConnection,
        client_id: &str,
    ) -> Option<SharedConnection> {
        let conn_id = connection.id();
        let mut inner = self.inner.write();

        // The same socket re-registered under another id must not leave a
        // stale forward entry behind.
        if let Some(previous_client) = inner.clients.get(&conn_id).cloned() {
            if previous_client != client_id
                && inner
                    .sockets
                    .get(&previous_client)
                    .is_some_and(|s| s.id() == conn_id)
            {
                inner.sockets.remove(&previous_client);
            }
        }

        let evicted = inner.sockets.insert(client_id.to_string(), connection);
        if let Some(old) = &evicted {
            if old.id() != conn_id {
                inner.clients.remove(&old.id());
            }
        }
        inner.clients.insert(conn_id, client_id.to_string());

        evicted.filter(|old| old.id() != conn_id)
    }

    /// Remove the registration of exactly this `connection`/`client_id` pair.
    ///
    /// A newer connection registered for the same client id is left alone.
    /// Returns whether anything was removed.
    pub(crate) fn unregister(&self, connection: &dyn Connection, client_id: &str) -> bool {
        let conn_id = connection.id();
        let mut inner = self.inner.write();

        let forward = inner
            .sockets
            .get(client_id)
            .is_some_and(|s| s.id() == conn_id);
        if forward {
            inner.sockets.remove(client_id);
        }

        let reverse = inner
            .clients
            .get(&conn_id)
            .is_some_and(|c| c == client_id);
        if reverse {
            inner.clients.remove(&conn_id);
        }

        forward || reverse
    }

    pub fn socket_for(&self, client_id: &str) -> Result<SharedConnection, HubError> {
        self.inner
            .read()
            .sockets
            .get(client_id)
            .cloned()
            .ok_or_else(|| HubError::SocketNotFound(client_id.to_string()))
    }

    pub fn client_for(&self, connection: &dyn Connection) -> Result<ClientId, HubError> {
        let conn_id = connection.id();
        self.inner
            .read()
            .clients
            .get(&conn_id)
            .cloned()
            .ok_or(HubError::ClientIdNotFound(conn_id))
    }

    /// Point-in-time copy of the `client id -> connection` direction.
    pub fn sockets_snapshot(&self) -> HashMap<ClientId, SharedConnection> {
        self.inner.read().sockets.clone()
    }

    /// Point-in-time copy of the `connection id -> client id` direction.
    pub fn clients_snapshot(&self) -> HashMap<ConnectionId, ClientId> {
        self.inner.read().clients.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().sockets.is_empty()
    }
}
