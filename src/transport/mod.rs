//! The `transport` module is the connection-lifecycle glue between the
//! WebSocket server and the broker.
//!
//! It accepts sockets, resolves the client id from the `id` query parameter,
//! registers the connection with the `ConnectionManager`, and routes inbound
//! protocol frames to the subscription and dashboard services.

pub mod message;
pub mod websocket;

pub use message::{ClientMessage, ServerMessage};
pub use websocket::{ServerContext, serve, start_websocket_server};
