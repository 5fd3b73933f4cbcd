//! # airhub
//!
//! `airhub` is the live-update hub of an air-quality dashboard. Browser
//! dashboards and devices connect over WebSockets; the hub tracks which socket
//! belongs to which client, which clients joined which topics, and fans
//! JSON events out to the currently connected members of a topic.
//!
//! ## Core Modules
//!
//! - `broker`: connection registry, topic membership and broadcast, plus the
//!   subscription and dashboard services built on them.
//! - `client`: the connection abstraction the broker sends to.
//! - `config`: loading server configuration from file and environment.
//! - `transport`: the WebSocket server and its JSON protocol.
//! - `utils`: error type and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;
