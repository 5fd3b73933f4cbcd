//! Batch subscription helpers used by the transport.

use std::sync::Arc;

use super::engine::ConnectionManager;
use super::topic::TopicId;

#[derive(Debug, Clone)]
pub struct SubscriptionService {
    manager: Arc<ConnectionManager>,
}

impl SubscriptionService {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// Join `client_id` to every topic in `topics`.
    pub fn subscribe(&self, client_id: &str, topics: &[TopicId]) {
        for topic in topics {
            self.manager.add_to_topic(topic, client_id);
        }
    }

    /// Remove `client_id` from every topic in `topics`.
    pub fn unsubscribe(&self, client_id: &str, topics: &[TopicId]) {
        for topic in topics {
            self.manager.remove_from_topic(topic, client_id);
        }
    }
}
