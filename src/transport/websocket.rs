//! WebSocket transport
//!
//! This file implements the WebSocket server that feeds the broker.
//! Responsibilities:
//! - Accept TCP/WebSocket connections and read the client id from the
//!   `?id=` query parameter of the handshake request
//! - Wrap each socket in a `WsConnection` and report open/close to the
//!   `ConnectionManager`
//! - Deserialize inbound JSON frames and forward them to the subscription and
//!   dashboard services
//!
//! Authentication happens in front of this server and is not checked here.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tracing::{debug, error, info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::protocol::Message as WsMessage;
use url::form_urlencoded;
use uuid::Uuid;

use crate::broker::{ConnectionManager, DashboardPublisher, SubscriptionService};
use crate::client::{Connection, WsConnection};
use crate::transport::message::{ClientMessage, ServerMessage};

/// Services a connection handler talks to. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub manager: Arc<ConnectionManager>,
    pub subscriptions: SubscriptionService,
    pub dashboard: Arc<DashboardPublisher>,
}

impl ServerContext {
    pub fn new(manager: Arc<ConnectionManager>, recent_logs: usize) -> Self {
        Self {
            subscriptions: SubscriptionService::new(manager.clone()),
            dashboard: Arc::new(DashboardPublisher::new(manager.clone(), recent_logs)),
            manager,
        }
    }
}

pub async fn start_websocket_server(addr: &str, ctx: ServerContext) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);
    serve(listener, ctx).await;
    Ok(())
}

/// Accept loop over an already bound listener. Runs until the task is dropped.
pub async fn serve(listener: TcpListener, ctx: ServerContext) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let ctx = ctx.clone();
                tokio::spawn(handle_connection(stream, peer, ctx));
            }
            Err(e) => warn!("Failed to accept connection: {e}"),
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, ctx: ServerContext) {
    let mut requested_id = None;
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        requested_id = client_id_from_query(req.uri().query());
        Ok(resp)
    };

    let ws_stream = match accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error from {peer}: {e}");
            return;
        }
    };
    let client_id = requested_id.unwrap_or_else(|| format!("client-{}", Uuid::new_v4()));

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let connection = Arc::new(WsConnection::new(tx));

    ctx.manager.on_open(connection.clone(), &client_id);

    let writer = {
        let connection = connection.clone();
        let client_id = client_id.clone();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    warn!("Failed to send message to {client_id}: {e}");
                    break;
                }
            }
            connection.mark_closed();
            debug!("Send loop closed for {client_id}");
        })
    };

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                handle_client_message(&ctx, connection.as_ref(), &client_id, text.as_str());
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Read error from {client_id}: {e}");
                break;
            }
        }
    }

    ctx.manager.on_close(connection.as_ref(), &client_id);
    connection.mark_closed();
    writer.abort();
    info!("{client_id} disconnected");
}

/// Extract a non-empty, percent-decoded `id` parameter from a raw query string.
pub(crate) fn client_id_from_query(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, value)| key == "id" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Apply one inbound text frame from `client_id`.
pub(crate) fn handle_client_message(
    ctx: &ServerContext,
    connection: &dyn Connection,
    client_id: &str,
    text: &str,
) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Subscribe { topics }) => {
            ctx.subscriptions.subscribe(client_id, &topics);
            info!("{client_id} subscribed to {topics:?}");
            reply(connection, &ServerMessage::Subscribed { topics });
        }
        Ok(ClientMessage::Unsubscribe { topics }) => {
            ctx.subscriptions.unsubscribe(client_id, &topics);
            info!("{client_id} unsubscribed from {topics:?}");
            reply(connection, &ServerMessage::Unsubscribed { topics });
        }
        Ok(ClientMessage::Measurement(reading)) => {
            if let Err(e) = ctx.dashboard.record_measurement(reading) {
                error!("Failed to broadcast measurement from {client_id}: {e}");
                reply_error(connection, "failed to broadcast measurement");
            }
        }
        Ok(ClientMessage::ClearData) => {
            if let Err(e) = ctx.dashboard.clear_data() {
                error!("Failed to broadcast data deletion: {e}");
                reply_error(connection, "failed to broadcast data deletion");
            }
        }
        Ok(ClientMessage::ChangeInterval { interval }) => {
            if let Err(e) = ctx.dashboard.change_interval(interval) {
                error!("Failed to broadcast interval change: {e}");
                reply_error(connection, "failed to broadcast interval change");
            }
        }
        Ok(ClientMessage::UpdateThresholds { thresholds }) => {
            if let Err(e) = ctx.dashboard.update_thresholds(thresholds) {
                warn!("Failed to update thresholds from {client_id}: {e}");
                reply_error(connection, &format!("failed to update thresholds: {e}"));
            }
        }
        Err(err) => {
            warn!(
                "Invalid client message from {client_id}: {err} | {}",
                text.chars().take(100).collect::<String>()
            );
            reply_error(connection, &format!("invalid message: {err}"));
        }
    }
}

fn reply_error(connection: &dyn Connection, message: &str) {
    reply(
        connection,
        &ServerMessage::Error {
            message: message.to_string(),
        },
    );
}

fn reply(connection: &dyn Connection, message: &ServerMessage) {
    let text = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize reply: {e}");
            return;
        }
    };
    if let Err(e) = connection.send(text) {
        debug!("Dropped reply: {e}");
    }
}
