//! WebSocket handler for the development host.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS on `/v1/bridge`
//! - Register the session in the hub so `emit` reaches it
//! - Run inbound bridge messages on the blocking pool (bound functions are
//!   synchronous and may be slow) and answer the originating session only
//! - Lifecycle: ping + close

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Duration;

use webshell_core::error::{BridgeError, Result};

use crate::app_state::AppState;
use crate::script;
use crate::transport::codec::{decode, Inbound};
use crate::transport::hub::Connection;

const OUTBOUND_QUEUE: usize = 1024;
const PING_EVERY: Duration = Duration::from_secs(20);

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = run_session(app, socket).await {
            tracing::debug!(error = %e, "bridge session ended with error");
        }
    })
}

// --------------------
// Core session loop
// --------------------
async fn run_session(app: AppState, socket: WebSocket) -> Result<()> {
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE);
    let session = app.hub().insert(Connection { tx: out_tx.clone() });
    tracing::info!(session, sessions = app.hub().len(), "page connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut ping_tick = tokio::time::interval(PING_EVERY);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let result = loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break Ok(());
                        }
                    }
                    None => break Ok(()),
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break Ok(()); };
                let msg = match incoming {
                    Ok(m) => m,
                    Err(e) => break Err(BridgeError::Internal(format!("websocket read failed: {e}"))),
                };

                match decode(msg) {
                    Inbound::Text(text) => dispatch(&app, text, out_tx.clone()),
                    Inbound::Binary { bytes_len } => {
                        tracing::debug!(session, bytes_len, "binary frame ignored");
                    }
                    Inbound::Ping(payload) => {
                        let _ = out_tx.send(Message::Pong(payload)).await;
                    }
                    Inbound::Pong => {}
                    Inbound::Close => break Ok(()),
                }
            }

            _ = ping_tick.tick() => {
                let _ = out_tx.send(Message::Ping(Vec::new())).await;
            }
        }
    };

    app.hub().remove(session);
    tracing::info!(session, sessions = app.hub().len(), "page disconnected");
    result
}

/// Handle one inbound message off the reactor and queue the reply (if any)
/// for this session.
fn dispatch(app: &AppState, text: String, tx: mpsc::Sender<Message>) {
    let bridge = app.bridge();
    tokio::spawn(async move {
        let namespace = bridge.namespace().to_string();
        let reply = match tokio::task::spawn_blocking(move || bridge.handle_message(&text)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "bridge dispatch task failed");
                return;
            }
        };
        if reply.is_empty() {
            return;
        }
        let _ = tx.send(Message::Text(script::response(&namespace, &reply))).await;
    });
}
