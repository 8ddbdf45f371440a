//! WebSocket transport.
//!
//! Each accepted socket gets a fresh [`ConnectionHandle`]; the task here
//! owns both socket halves and shuttles frames in two directions:
//! inbound text frames are decoded into [`ClientEvent`]s and dispatched
//! to the registry, outbound [`ServerEvent`]s are drained from the
//! handle's channel and written as JSON text frames.
//!
//! The registry force-closes a connection by cancelling its token
//! (rejection, eviction, drain). On cancellation the task flushes
//! events already queued before closing the socket, so a rejected
//! candidate still sees its `approval-rejected` frame.

use crate::actors::ConnectionHandle;
use crate::api::AppState;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use room_protocol::{ClientEvent, ConnectionId, MediaKind, ServerEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Upgrade handler for `GET /ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one connection to completion.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::new();
    let (handle, mut events) = ConnectionHandle::open(
        connection_id,
        state.event_buffer,
        state.registry.child_token(),
    );

    state.metrics.connection_opened();
    info!(
        target: "rc.ws",
        connection_id = %connection_id,
        "WebSocket connection opened"
    );

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            () = handle.closed() => {
                // Force-closed by the registry; flush what was queued
                // before the close frame.
                flush_pending(&mut events, &mut ws_tx).await;
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }

            event = events.recv() => {
                match event {
                    Some(event) => {
                        if write_event(&mut ws_tx, &event).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(&state, &handle, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(
                            target: "rc.ws",
                            connection_id = %connection_id,
                            error = %err,
                            "WebSocket read error"
                        );
                        break;
                    }
                }
            }
        }
    }

    // Socket gone, at any admission state; the registry sorts out which.
    if let Err(err) = state.registry.disconnect(connection_id).await {
        warn!(
            target: "rc.ws",
            connection_id = %connection_id,
            error = %err,
            "Failed to report disconnect to registry"
        );
    }

    state.metrics.connection_closed();
    info!(
        target: "rc.ws",
        connection_id = %connection_id,
        "WebSocket connection closed"
    );
}

/// Decode one inbound frame and dispatch it to the registry.
///
/// Request failures are not terminal: they come back to the sender as a
/// `room-error` frame and the connection stays open.
async fn handle_frame(state: &AppState, handle: &ConnectionHandle, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(err) => {
            debug!(
                target: "rc.ws",
                connection_id = %handle.connection_id(),
                error = %err,
                "Discarding malformed client event"
            );
            handle.send(ServerEvent::RoomError {
                message: "Malformed event".to_string(),
            });
            return;
        }
    };

    let connection_id = handle.connection_id();
    let registry = &state.registry;

    let result = match event {
        ClientEvent::JoinRoom {
            room_id,
            username,
            peer_id,
            is_host,
        } => registry
            .join_room(room_id, username, peer_id, is_host, handle.clone())
            .await
            .map(|_| ()),

        ClientEvent::ApproveParticipant {
            room_id,
            participant_id,
        } => {
            registry
                .approve_participant(room_id, connection_id, participant_id)
                .await
        }

        ClientEvent::RejectParticipant {
            room_id,
            participant_id,
        } => {
            registry
                .reject_participant(room_id, connection_id, participant_id)
                .await
        }

        ClientEvent::ToggleAudio {
            room_id, enabled, ..
        } => {
            registry
                .toggle_media(room_id, connection_id, MediaKind::Audio, enabled)
                .await
        }

        ClientEvent::ToggleVideo {
            room_id, enabled, ..
        } => {
            registry
                .toggle_media(room_id, connection_id, MediaKind::Video, enabled)
                .await
        }

        ClientEvent::RemoveParticipant {
            room_id,
            participant_id,
            ..
        } => {
            registry
                .remove_participant(room_id, connection_id, participant_id)
                .await
        }

        ClientEvent::GetWaitingParticipants { room_id } => {
            registry.list_waiting(room_id, connection_id).await
        }

        ClientEvent::Ping => {
            // Answered through the event channel so the pong keeps its
            // place relative to registry fan-out.
            handle.send(ServerEvent::Pong);
            Ok(())
        }
    };

    if let Err(err) = result {
        handle.send(ServerEvent::RoomError {
            message: err.client_message(),
        });
    }
}

/// Write one event as a JSON text frame.
async fn write_event<S>(ws_tx: &mut S, event: &ServerEvent) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    match serde_json::to_string(event) {
        Ok(json) => ws_tx.send(Message::Text(json.into())).await.map_err(|_| ()),
        Err(err) => {
            warn!(target: "rc.ws", error = %err, "Failed to serialize server event");
            Ok(())
        }
    }
}

/// Drain events queued before a forced close.
async fn flush_pending<S>(events: &mut mpsc::Receiver<ServerEvent>, ws_tx: &mut S)
where
    S: SinkExt<Message> + Unpin,
{
    while let Ok(event) = events.try_recv() {
        if write_event(ws_tx, &event).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::actors::{RegistryMetrics, RoomRegistryHandle};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc::Receiver;

    fn test_state() -> AppState {
        let metrics = RegistryMetrics::new();
        let registry = RoomRegistryHandle::new(
            "rc-test".to_string(),
            Duration::from_secs(60),
            Arc::clone(&metrics),
        );
        AppState {
            registry,
            metrics,
            event_buffer: 16,
        }
    }

    fn test_connection(state: &AppState) -> (ConnectionHandle, Receiver<ServerEvent>) {
        ConnectionHandle::open(ConnectionId::new(), 16, state.registry.child_token())
    }

    async fn recv_event(rx: &mut Receiver<ServerEvent>) -> ServerEvent {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn test_malformed_frame_yields_room_error() {
        let state = test_state();
        let (handle, mut rx) = test_connection(&state);

        handle_frame(&state, &handle, "{not json").await;

        assert!(matches!(
            recv_event(&mut rx).await,
            ServerEvent::RoomError { .. }
        ));
        state.registry.cancel();
    }

    #[tokio::test]
    async fn test_ping_answered_with_pong_in_order() {
        let state = test_state();
        let (handle, mut rx) = test_connection(&state);

        handle_frame(&state, &handle, r#"{"type":"ping"}"#).await;

        assert_eq!(recv_event(&mut rx).await, ServerEvent::Pong);
        state.registry.cancel();
    }

    #[tokio::test]
    async fn test_join_against_missing_room_reports_error_frame() {
        let state = test_state();
        let (handle, mut rx) = test_connection(&state);

        let frame = format!(
            r#"{{"type":"join-room","roomId":"{}","username":"ada","peerId":"p"}}"#,
            room_protocol::RoomId::new()
        );
        handle_frame(&state, &handle, &frame).await;

        match recv_event(&mut rx).await {
            ServerEvent::RoomError { message } => assert_eq!(message, "Room not found"),
            other => panic!("expected room-error, got {other:?}"),
        }
        state.registry.cancel();
    }

    #[tokio::test]
    async fn test_join_frame_admits_first_connection_as_host() {
        let state = test_state();
        let (handle, mut rx) = test_connection(&state);
        let room_id = state.registry.create_room().await.unwrap();

        let frame = format!(
            r#"{{"type":"join-room","roomId":"{room_id}","username":"ada","peerId":"p"}}"#
        );
        handle_frame(&state, &handle, &frame).await;

        assert_eq!(
            recv_event(&mut rx).await,
            ServerEvent::HostStatus { is_host: true }
        );
        state.registry.cancel();
    }

    #[tokio::test]
    async fn test_unauthorized_frame_reports_error_but_keeps_connection() {
        let state = test_state();
        let room_id = state.registry.create_room().await.unwrap();
        let (host, _host_rx) = test_connection(&state);
        state
            .registry
            .join_room(room_id, "host".to_string(), "p".to_string(), false, host)
            .await
            .unwrap();

        let (outsider, mut rx) = test_connection(&state);
        let frame = format!(
            r#"{{"type":"remove-participant","roomId":"{room_id}","participantId":"{}","peerId":"p"}}"#,
            ConnectionId::new()
        );
        handle_frame(&state, &outsider, &frame).await;

        assert!(matches!(
            recv_event(&mut rx).await,
            ServerEvent::RoomError { .. }
        ));
        assert!(!outsider.is_closed());
        state.registry.cancel();
    }
}
