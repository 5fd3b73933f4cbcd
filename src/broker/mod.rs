//! The broker contains the connection and topic bookkeeping and the
//! broadcast fan-out, plus the dashboard services built on top of them.
//!
//! Public types:
//! - `ConnectionManager`: registry + topic index + broadcast.
//! - `SubscriptionService`: batch subscribe/unsubscribe.
//! - `DashboardPublisher`: recent readings, thresholds and dashboard events.

pub mod dashboard;
pub mod engine;
pub mod message;
pub mod registry;
pub mod subscription;
pub mod threshold;
pub mod topic;

pub use dashboard::DashboardPublisher;
pub use engine::ConnectionManager;
pub use registry::{ClientId, ConnectionRegistry};
pub use subscription::SubscriptionService;
pub use topic::{MembershipChange, MembershipStats, TopicId, TopicIndex};
