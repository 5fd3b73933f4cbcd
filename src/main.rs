//! CLI for airhub
//!
//! Subcommands:
//! - `server`: run the WebSocket hub
//! - `watch`: connect as a dashboard, subscribe and print incoming events

use std::process::ExitCode;
use std::sync::Arc;

use airhub::broker::ConnectionManager;
use airhub::broker::message::DASHBOARD;
use airhub::config::{Settings, load_config};
use airhub::transport::{ServerContext, start_websocket_server};
use airhub::utils::logging;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "airhub")]
enum Command {
    /// Start the WebSocket server
    Server,
    /// Connect as a dashboard client and print every event received
    Watch {
        /// WebSocket server URL to connect to
        #[arg(long, default_value = "ws://127.0.0.1:8181")]
        url: String,
        /// Client id announced in the handshake
        #[arg(long, default_value = "watcher")]
        id: String,
        /// Topics to join; defaults to the dashboard topic
        #[arg(long = "topic")]
        topics: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cmd = Command::parse();

    match cmd {
        Command::Server => {
            let config = match load_config() {
                Ok(config) => config,
                Err(e) => {
                    // The configured level is unknown, so log at the default.
                    logging::init("info");
                    error!("Failed to load configuration: {e}");
                    return ExitCode::FAILURE;
                }
            };
            logging::init(&config.logging.level);
            if let Err(e) = run_server(config).await {
                error!("Server failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
        Command::Watch { url, id, topics } => {
            logging::init("info");
            if let Err(e) = run_watch(&url, &id, topics).await {
                error!("Watch failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

async fn run_server(config: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let manager = Arc::new(ConnectionManager::new());
    let ctx = ServerContext::new(manager, config.dashboard.recent_logs);

    tokio::select! {
        res = start_websocket_server(&addr, ctx) => {
            res?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_watch(
    url: &str,
    id: &str,
    mut topics: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;
    use url::form_urlencoded;

    if topics.is_empty() {
        topics.push(DASHBOARD.to_string());
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("id", id)
        .finish();
    let (mut ws_stream, _response) = connect_async(format!("{url}/?{query}")).await?;
    info!("Connected to {url} as {id}");

    let subscribe = json!({ "type": "subscribe", "topics": topics });
    ws_stream
        .send(WsMessage::Text(subscribe.to_string().into()))
        .await?;

    while let Some(msg) = ws_stream.next().await {
        match msg? {
            WsMessage::Text(text) => println!("{text}"),
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    info!("Connection closed");
    Ok(())
}
