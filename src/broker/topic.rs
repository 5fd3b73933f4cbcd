//! Topic membership
//!
//! `TopicIndex` keeps two mirrored multi-maps, `topic -> members` and
//! `member -> topics`. A member appears under a topic iff the topic appears
//! under that member, and neither map ever holds an empty set: the key is
//! dropped together with its last entry.
//!
//! Membership is independent of connection state. An offline client stays a
//! member of its topics until it is removed explicitly.
//!
//! Both maps sit behind one lock and every mutation updates them under the
//! same write guard.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use super::registry::ClientId;

pub type TopicId = String;

#[derive(Debug, Default)]
struct Memberships {
    topic_members: HashMap<TopicId, HashSet<ClientId>>,
    member_topics: HashMap<ClientId, HashSet<TopicId>>,
}

#[derive(Debug, Default)]
pub struct TopicIndex {
    inner: RwLock<Memberships>,
}

/// Number of non-empty topics and of members with at least one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipStats {
    pub topics: usize,
    pub members: usize,
}

/// Outcome of `add` or `remove`. `stats` is read under the write guard of
/// that mutation, so it never reflects a concurrent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipChange {
    pub changed: bool,
    pub stats: MembershipStats,
}

impl Memberships {
    fn stats(&self) -> MembershipStats {
        MembershipStats {
            topics: self.topic_members.len(),
            members: self.member_topics.len(),
        }
    }
}

impl TopicIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `member_id` to `topic_id`. Duplicate adds are a no-op and report
    /// `changed: false`.
    pub(crate) fn add(&self, topic_id: &str, member_id: &str) -> MembershipChange {
        let mut inner = self.inner.write();
        let added = inner
            .topic_members
            .entry(topic_id.to_string())
            .or_default()
            .insert(member_id.to_string());
        inner
            .member_topics
            .entry(member_id.to_string())
            .or_default()
            .insert(topic_id.to_string());
        MembershipChange {
            changed: added,
            stats: inner.stats(),
        }
    }

    /// Remove `member_id` from `topic_id`, pruning whichever side ends up
    /// empty. Removing a membership that does not exist is a no-op.
    pub(crate) fn remove(&self, topic_id: &str, member_id: &str) -> MembershipChange {
        let mut inner = self.inner.write();

        let mut removed = false;
        if let Some(members) = inner.topic_members.get_mut(topic_id) {
            removed = members.remove(member_id);
            if members.is_empty() {
                inner.topic_members.remove(topic_id);
            }
        }
        if let Some(topics) = inner.member_topics.get_mut(member_id) {
            removed |= topics.remove(topic_id);
            if topics.is_empty() {
                inner.member_topics.remove(member_id);
            }
        }
        MembershipChange {
            changed: removed,
            stats: inner.stats(),
        }
    }

    /// Topics `member_id` belongs to; empty for an unknown member.
    pub fn topics_of(&self, member_id: &str) -> HashSet<TopicId> {
        self.inner
            .read()
            .member_topics
            .get(member_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Members of `topic_id`; empty for an unknown topic.
    pub fn members_of(&self, topic_id: &str) -> HashSet<ClientId> {
        self.inner
            .read()
            .topic_members
            .get(topic_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `topic_id` is a key in the index, i.e. has at least one member.
    pub fn contains_topic(&self, topic_id: &str) -> bool {
        self.inner.read().topic_members.contains_key(topic_id)
    }

    pub fn contains_member(&self, member_id: &str) -> bool {
        self.inner.read().member_topics.contains_key(member_id)
    }

    pub fn topics_snapshot(&self) -> HashMap<TopicId, HashSet<ClientId>> {
        self.inner.read().topic_members.clone()
    }

    pub fn members_snapshot(&self) -> HashMap<ClientId, HashSet<TopicId>> {
        self.inner.read().member_topics.clone()
    }

    pub fn stats(&self) -> MembershipStats {
        self.inner.read().stats()
    }
}
