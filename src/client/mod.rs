//! The `client` module defines the transport connection abstraction the
//! broker delivers to.
//!
//! The broker only needs three things from a live socket: a stable identity,
//! an availability predicate and a non-blocking `send`. `WsConnection` is the
//! implementation used by the WebSocket transport.

pub mod connection;
pub use connection::{Connection, ConnectionId, SharedConnection, WsConnection};
