//! Connection manager
//!
//! `ConnectionManager` ties the connection registry and the topic index
//! together and fans broadcasts out over them. Responsibilities:
//! - track which live connection serves which client id (`on_open`/`on_close`)
//! - track topic membership independently of connection state
//! - serialize a payload once and push it to every member of a topic whose
//!   connection is registered and available
//!
//! Concurrency and usage notes:
//! - The API is synchronous and takes `&self`; share the manager behind an
//!   `Arc`. Locks are internal and are never held while sending.
//! - A broadcast works on the membership snapshot read when it starts.
//!   Members joining or leaving mid-broadcast may or may not be included.
//! - Delivery is at-most-once to currently available connections. Offline
//!   members are skipped, not queued, and failed sends are not retried.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{Span, debug, info, warn};

use super::message::camel_case_json;
use super::registry::{ClientId, ConnectionRegistry};
use super::topic::{MembershipStats, TopicId, TopicIndex};
use crate::client::{Connection, SharedConnection};
use crate::utils::error::HubError;

#[derive(Debug)]
pub struct ConnectionManager {
    registry: ConnectionRegistry,
    topics: TopicIndex,
    span: Span,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::with_span(tracing::info_span!("connection_manager"))
    }

    /// Create a manager that records all of its log events inside `span`.
    pub fn with_span(span: Span) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            topics: TopicIndex::new(),
            span,
        }
    }

    /// Read-only view of the connection registry.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Read-only view of topic membership.
    pub fn topics(&self) -> &TopicIndex {
        &self.topics
    }

    /// Register `connection` as the live socket for `client_id`.
    ///
    /// A connection already registered for `client_id` is evicted but not
    /// closed. Topic membership is untouched, so a reconnecting client keeps
    /// receiving broadcasts for the topics it joined earlier.
    pub fn on_open(&self, connection: SharedConnection, client_id: &str) {
        let _enter = self.span.enter();
        let conn_id = connection.id();

        if let Some(evicted) = self.registry.register(connection, client_id) {
            info!(
                client_id,
                old_connection = %evicted.id(),
                new_connection = %conn_id,
                "Replaced existing connection for client"
            );
        } else {
            info!(client_id, connection = %conn_id, "Client connected");
        }

        let topics = self.topics.topics_of(client_id);
        if !topics.is_empty() {
            info!(client_id, ?topics, "Client rejoined with existing topic memberships");
        }
        debug!(connections = self.registry.len(), "Connection registry updated");
    }

    /// Drop the registration of this exact `connection`/`client_id` pair.
    /// Topic membership is kept.
    pub fn on_close(&self, connection: &dyn Connection, client_id: &str) {
        let _enter = self.span.enter();
        if self.registry.unregister(connection, client_id) {
            info!(client_id, connection = %connection.id(), "Client disconnected");
        } else {
            debug!(
                client_id,
                connection = %connection.id(),
                "Close for a connection that is no longer registered"
            );
        }
    }

    pub fn socket_for_client(&self, client_id: &str) -> Result<SharedConnection, HubError> {
        self.registry.socket_for(client_id)
    }

    pub fn client_for_socket(&self, connection: &dyn Connection) -> Result<ClientId, HubError> {
        self.registry.client_for(connection)
    }

    pub fn add_to_topic(&self, topic_id: &str, member_id: &str) {
        let _enter = self.span.enter();
        let change = self.topics.add(topic_id, member_id);
        if change.changed {
            debug!(topic_id, member_id, "Added member to topic");
        }
        self.log_current_state(change.stats);
    }

    pub fn remove_from_topic(&self, topic_id: &str, member_id: &str) {
        let _enter = self.span.enter();
        let change = self.topics.remove(topic_id, member_id);
        if change.changed {
            debug!(topic_id, member_id, "Removed member from topic");
        }
        self.log_current_state(change.stats);
    }

    pub fn topics_for_member(&self, member_id: &str) -> HashSet<TopicId> {
        self.topics.topics_of(member_id)
    }

    pub fn members_for_topic(&self, topic_id: &str) -> HashSet<ClientId> {
        self.topics.members_of(topic_id)
    }

    /// Push `message` to every available member connection of `topic_id`.
    ///
    /// Returns how many sends went through. An unknown topic is logged and
    /// yields `Ok(0)`; per-member send failures are logged and skipped. Only
    /// a payload that cannot be serialized is reported as an error.
    pub fn broadcast_to_topic<T: Serialize + ?Sized>(
        &self,
        topic_id: &str,
        message: &T,
    ) -> Result<usize, HubError> {
        let _enter = self.span.enter();

        let members = self.topics.members_of(topic_id);
        if members.is_empty() {
            warn!(topic_id, "No topic found: {topic_id}");
            return Ok(0);
        }

        let text = camel_case_json(message)?;
        let mut delivered = 0;

        for member in &members {
            let Ok(socket) = self.registry.socket_for(member) else {
                continue;
            };
            if !socket.is_available() {
                continue;
            }
            match socket.send(text.clone()) {
                Ok(()) => {
                    delivered += 1;
                    debug!(topic_id, "Sent message to client {member}");
                }
                Err(e) => warn!(topic_id, client_id = %member, "Failed to send message: {e}"),
            }
        }

        Ok(delivered)
    }

    /// `stats` come from the mutation itself; the listing is a later read and
    /// is only taken when debug logging is on.
    fn log_current_state(&self, stats: MembershipStats) {
        debug!(
            topics = stats.topics,
            members = stats.members,
            "Current state: {:?}",
            self.topics.topics_snapshot()
        );
    }
}
