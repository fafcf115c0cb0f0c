//! The chat WebSocket endpoint: `GET /chat/{groupCode}`.
//!
//! The bearer token is validated before the upgrade; every later handshake
//! failure closes the socket with a policy-violation close frame. Once the
//! handshake passes, the connection is registered, the recent history is
//! pushed to it, and its frames are handled strictly in order until the
//! socket closes, errors, or goes idle past the configured timeout.

use std::time::Duration;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use itinero_core::error::AppError;
use itinero_entity::trip::Trip;
use itinero_entity::user::User;
use itinero_realtime::broadcast;
use itinero_realtime::dispatcher::ChatDispatcher;
use itinero_realtime::protocol::ChatNotification;

use crate::error::ApiResult;
use crate::state::AppState;

/// Query parameters accepted by the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Bearer token; clients that cannot set headers pass it here.
    pub token: Option<String>,
}

/// GET /chat/{groupCode} — authenticate, then upgrade.
pub async fn chat_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Path(group_code): Path<String>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let token = bearer_token(&headers, query.token.as_deref())
        .ok_or_else(|| AppError::authentication("Authentication required"))?;
    let claims = state.jwt_decoder.decode_token(&token)?;

    Ok(ws.on_upgrade(move |socket| chat_session(state, socket, group_code, claims.email)))
}

fn bearer_token(headers: &HeaderMap, query_token: Option<&str>) -> Option<String> {
    if let Some(token) = query_token {
        return Some(token.to_string());
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

/// Runs one chat session from handshake to deregistration.
async fn chat_session(state: AppState, socket: WebSocket, group_code: String, email: String) {
    let mut socket = socket;

    // Handshake: resolve the user and check they may enter this group.
    let (user, trip) = match resolve_participant(&state, &group_code, &email).await {
        Ok(pair) => pair,
        Err(reason) => {
            debug!(group_code = %group_code, reason, "Chat handshake rejected");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: reason.into(),
                })))
                .await;
            return;
        }
    };

    // The chat group row is provisioned lazily at first connection.
    if let Err(e) = state
        .chat_repo
        .ensure_group(&group_code, &trip.destination, trip.owner_id)
        .await
    {
        warn!(group_code = %group_code, error = %e, "Failed to provision chat group");
    }

    let (ws_tx, mut ws_rx) = socket.split();

    let display_name = user.display_name();
    let (conn, outbound_rx) = state
        .chat_registry
        .register(user.id, &display_name, &group_code);
    let dispatcher = ChatDispatcher::new(
        state.chat_registry.clone(),
        state.message_store.clone(),
        conn.clone(),
    );

    // History goes to the new connection only, oldest first.
    let history_limit = state.config.chat.history_limit;
    match state.message_store.recent(&group_code, history_limit, 0).await {
        Ok(messages) => {
            for message in messages {
                let notification = ChatNotification::message_received(&group_code, message);
                conn.send(broadcast::encode(&notification));
            }
        }
        Err(e) => warn!(group_code = %group_code, error = %e, "Failed to load history"),
    }

    let keepalive = Duration::from_secs(state.config.chat.keepalive_interval_seconds);
    let forwarder = tokio::spawn(forward_outbound(ws_tx, outbound_rx, keepalive));

    // Inbound loop: frames are handled sequentially; a quiet socket is
    // closed after the idle timeout.
    let idle = Duration::from_secs(state.config.chat.idle_timeout_seconds);
    loop {
        let frame = match timeout(idle, ws_rx.next()).await {
            Err(_) => {
                info!(conn_id = %conn.id, "Chat connection idle, closing");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                debug!(conn_id = %conn.id, error = %e, "Chat socket error");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => dispatcher.handle_frame(text.as_str()).await,
            Message::Close(_) => break,
            // Ping/pong are answered by the protocol layer.
            _ => {}
        }
    }

    state.chat_registry.deregister(&conn);
    forwarder.abort();

    info!(
        conn_id = %conn.id,
        user_id = user.id,
        group_code = %group_code,
        "Chat connection closed"
    );
}

/// Forwards queued outbound frames to the socket, interleaving keepalive
/// pings. Ends when the registry drops the connection or the socket dies.
async fn forward_outbound(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut outbound_rx: tokio::sync::mpsc::Receiver<String>,
    keepalive: Duration,
) {
    let mut ticker = tokio::time::interval(keepalive);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await; // first tick fires immediately

    loop {
        tokio::select! {
            frame = outbound_rx.recv() => match frame {
                Some(frame) => {
                    if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            _ = ticker.tick() => {
                if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Resolves the connecting user and enforces the member-or-owner rule.
/// A `&'static str` failure becomes the close-frame reason.
async fn resolve_participant(
    state: &AppState,
    group_code: &str,
    email: &str,
) -> Result<(User, Trip), &'static str> {
    let user = match state.user_repo.find_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err("User not found"),
        Err(_) => return Err("User lookup failed"),
    };

    let trip_id = match state.trip_repo.find_id_by_group_code(group_code).await {
        Ok(Some(trip_id)) => trip_id,
        Ok(None) => return Err("Trip not found"),
        Err(_) => return Err("Trip lookup failed"),
    };

    let is_member = state
        .trip_repo
        .is_member(user.id, trip_id)
        .await
        .unwrap_or(false);
    let is_owner = state
        .trip_repo
        .is_owner(user.id, trip_id)
        .await
        .unwrap_or(false);
    if !is_member && !is_owner {
        return Err("Access denied to group");
    }

    let trip = match state.trip_repo.find_by_id(trip_id).await {
        Ok(Some(trip)) => trip,
        _ => return Err("Trip not found"),
    };

    Ok((user, trip))
}
