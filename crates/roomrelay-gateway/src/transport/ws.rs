//! WebSocket handler.
//!
//! Responsibilities:
//! - Origin check, then upgrade HTTP -> WS
//! - Assign the connection id and open the session span
//! - Feed connect / message / disconnect / transport-error into the relay
//! - Drain the session's outbound queue into the socket
//! - Keepalive ping (no idle timeout: sessions live until the peer closes)

use std::borrow::Cow;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use roomrelay_core::error::RelayError;

use crate::app_state::AppState;
use crate::config::DecodeErrorAction;
use crate::relay::Connection;
use crate::transport::codec::{classify, Inbound};

fn error_json(err: &RelayError) -> String {
    json!({
        "type": "error",
        "code": err.client_code().as_str(),
        "msg": err.to_string(),
    })
    .to_string()
}

/// What the session does after `on_message` fails.
#[derive(Debug)]
enum Reaction {
    Close(CloseFrame<'static>),
    Report(String),
    Log,
}

/// Only decode failures are the client's fault; anything else stays server-side.
fn reaction(err: &RelayError, action: DecodeErrorAction) -> Reaction {
    match (err, action) {
        (RelayError::Decode(_), DecodeErrorAction::Close) => Reaction::Close(CloseFrame {
            code: close_code::INVALID,
            reason: Cow::from("malformed payload"),
        }),
        (RelayError::Decode(_), DecodeErrorAction::Report) => Reaction::Report(error_json(err)),
        _ => Reaction::Log,
    }
}

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(
    State(app): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    if !app.origins().allows(origin) {
        app.metrics().origin_rejections.inc(&[]);
        tracing::warn!(origin = origin.unwrap_or_default(), "origin rejected");
        return (StatusCode::FORBIDDEN, "origin not allowed").into_response();
    }

    ws.on_upgrade(move |socket| {
        let id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("conn", conn = %id);
        run_session(app, id, socket).instrument(span)
    })
}

// --------------------
// Core session loop
// --------------------
async fn run_session(app: AppState, id: String, socket: WebSocket) {
    let relay = app.relay();
    let cfg = &app.cfg().relay;

    // ---- outbound queue
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(cfg.outbound_queue);
    let (mut ws_tx, mut ws_rx) = socket.split();

    if let Err(e) = relay.on_connect(&id, Connection::new(out_tx.clone())) {
        tracing::error!(error = %e, "connect notice failed");
    }

    let mut ping_tick = tokio::time::interval(Duration::from_millis(app.cfg().gateway.ping_interval_ms));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // first tick fires immediately
    ping_tick.tick().await;

    let mut close: Option<CloseFrame<'static>> = None;

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                let Some(m) = maybe_out else { break; };
                if ws_tx.send(m).await.is_err() {
                    break;
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let msg = match incoming {
                    Ok(m) => m,
                    Err(e) => {
                        relay.on_transport_error(&id, &e);
                        break;
                    }
                };

                match classify(msg) {
                    Inbound::Payload(raw) => {
                        let Err(e) = relay.on_message(&id, &raw) else { continue; };
                        match reaction(&e, cfg.on_decode_error) {
                            Reaction::Close(frame) => {
                                let _ = ws_tx.send(Message::Close(Some(frame.clone()))).await;
                                close = Some(frame);
                                break;
                            }
                            Reaction::Report(text) => {
                                let _ = out_tx.try_send(Message::Text(text));
                            }
                            Reaction::Log => {
                                tracing::error!(error = %e, "relay failed on inbound payload");
                            }
                        }
                    }
                    // tungstenite queues the Pong itself
                    Inbound::Ping | Inbound::Pong => {}
                    Inbound::Close(frame) => {
                        close = frame;
                        break;
                    }
                }
            }

            // keepalive
            _ = ping_tick.tick() => {
                let _ = out_tx.try_send(Message::Ping(Vec::new()));
            }
        }
    }

    // Stop accepting frames for this session before the room hears about it.
    drop(out_rx);
    if let Err(e) = relay.on_disconnect(&id, close.as_ref()) {
        tracing::error!(error = %e, "disconnect notice failed");
    }
}
