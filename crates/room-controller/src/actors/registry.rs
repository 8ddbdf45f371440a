//! `RoomRegistryActor` - the single owner of all room state.
//!
//! The actor processes one mailbox message at a time; each message is
//! handled to completion, fan-out included, before the next is taken.
//! That single serialization point is the load-bearing design choice:
//! no two mutations of the same room ever interleave, and the reaper's
//! emptiness re-check cannot race a concurrent join because grace-timer
//! expiries re-enter the same mailbox as ordinary [`RegistryMessage::ReapRoom`]
//! events.
//!
//! # Admission
//!
//! Per (room, connection) the states are
//! `Unjoined -> {Host-Joined | Waiting} -> {Joined | Rejected | Disconnected}`:
//!
//! - A join against a missing room fails with `RoomNotFound`.
//! - If the host flag is set or the host slot is vacant, the connection
//!   is admitted directly as host.
//! - Otherwise it waits for the host's approve/reject decision.
//!
//! Host authority is lost on disconnect and never reassigned
//! automatically; the next joiner takes the vacant slot.

use super::connection::ConnectionHandle;
use super::messages::{JoinOutcome, RegistryMessage, RegistryStatus};
use super::metrics::RegistryMetrics;
use super::room::{Participant, Room, WaitingParticipant};
use crate::errors::RoomError;

use room_protocol::{ConnectionId, MediaKind, RoomId, RoomInfo, ServerEvent};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Default channel buffer size for the registry mailbox.
const REGISTRY_CHANNEL_BUFFER: usize = 1000;

fn internal<E: Display>(err: E) -> RoomError {
    RoomError::Internal(format!("registry mailbox error: {err}"))
}

/// Handle to the `RoomRegistryActor`.
///
/// This is the public interface for all room mutation. All methods are
/// async and return results via oneshot channels.
#[derive(Clone)]
pub struct RoomRegistryHandle {
    sender: mpsc::Sender<RegistryMessage>,
    cancel_token: CancellationToken,
}

impl RoomRegistryHandle {
    /// Create a new `RoomRegistryActor` and return a handle to it.
    ///
    /// This spawns the actor task and returns immediately.
    ///
    /// # Arguments
    ///
    /// * `node_id` - instance ID, for log correlation only
    /// * `empty_room_grace` - how long a room must stay empty before deletion
    /// * `metrics` - shared registry metrics
    #[must_use]
    pub fn new(
        node_id: String,
        empty_room_grace: Duration,
        metrics: Arc<RegistryMetrics>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(REGISTRY_CHANNEL_BUFFER);
        let cancel_token = CancellationToken::new();

        let actor = RoomRegistryActor {
            node_id,
            receiver,
            self_sender: sender.clone(),
            cancel_token: cancel_token.clone(),
            rooms: HashMap::new(),
            empty_room_grace,
            accepting_new: true,
            metrics,
        };

        tokio::spawn(actor.run());

        Self {
            sender,
            cancel_token,
        }
    }

    /// Allocate a new empty room and return its id.
    pub async fn create_room(&self) -> Result<RoomId, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::CreateRoom { respond_to: tx })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Snapshot a room for the lifecycle API.
    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::GetRoomInfo {
                room_id,
                respond_to: tx,
            })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Request admission for a connection.
    ///
    /// The registry delivers all resulting protocol events (host
    /// confirmation, roster snapshot, waiting acknowledgment, the
    /// host's `join-request`) through the connection handles involved;
    /// the returned [`JoinOutcome`] only says which path was taken.
    pub async fn join_room(
        &self,
        room_id: RoomId,
        username: String,
        peer_id: String,
        wants_host: bool,
        connection: ConnectionHandle,
    ) -> Result<JoinOutcome, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::JoinRoom {
                room_id,
                username,
                peer_id,
                wants_host,
                connection,
                respond_to: tx,
            })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Host decision: admit a waiting candidate. Idempotent against
    /// stale or duplicate approvals.
    pub async fn approve_participant(
        &self,
        room_id: RoomId,
        caller: ConnectionId,
        participant_id: ConnectionId,
    ) -> Result<(), RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::ApproveParticipant {
                room_id,
                caller,
                participant_id,
                respond_to: tx,
            })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Host decision: turn a waiting candidate away and force-close it.
    pub async fn reject_participant(
        &self,
        room_id: RoomId,
        caller: ConnectionId,
        participant_id: ConnectionId,
    ) -> Result<(), RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::RejectParticipant {
                room_id,
                caller,
                participant_id,
                respond_to: tx,
            })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Host-only query of the waiting set; delivered to the host's own
    /// connection. Unauthorized callers get nothing, not an error.
    pub async fn list_waiting(
        &self,
        room_id: RoomId,
        caller: ConnectionId,
    ) -> Result<(), RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::ListWaiting {
                room_id,
                caller,
                respond_to: tx,
            })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Apply a self media-state change and broadcast it. Requests from
    /// connections that are not joined members are silently ignored.
    pub async fn toggle_media(
        &self,
        room_id: RoomId,
        caller: ConnectionId,
        kind: MediaKind,
        enabled: bool,
    ) -> Result<(), RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::ToggleMedia {
                room_id,
                caller,
                kind,
                enabled,
                respond_to: tx,
            })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Host-only eviction of an admitted member.
    pub async fn remove_participant(
        &self,
        room_id: RoomId,
        caller: ConnectionId,
        participant_id: ConnectionId,
    ) -> Result<(), RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::RemoveParticipant {
                room_id,
                caller,
                participant_id,
                respond_to: tx,
            })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Handle a connection loss at any admission state.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<(), RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::Disconnect {
                connection_id,
                respond_to: tx,
            })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Get the current registry status.
    pub async fn status(&self) -> Result<RegistryStatus, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::GetStatus { respond_to: tx })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)
    }

    /// Begin draining: refuse new rooms and joins, force-close every
    /// connection. The actor keeps serving reads until [`Self::cancel`].
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RegistryMessage::Shutdown { respond_to: tx })
            .await
            .map_err(internal)?;
        rx.await.map_err(internal)?
    }

    /// Cancel the actor (for immediate shutdown).
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Get a child token, used to tie connection lifetimes to the
    /// registry's own.
    #[must_use]
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }
}

/// The `RoomRegistryActor` implementation.
struct RoomRegistryActor {
    /// Instance ID, for log correlation.
    node_id: String,
    /// Message receiver.
    receiver: mpsc::Receiver<RegistryMessage>,
    /// Sender into our own mailbox, cloned into reap timers.
    self_sender: mpsc::Sender<RegistryMessage>,
    /// Cancellation token (root).
    cancel_token: CancellationToken,
    /// All rooms, by id. Exclusively owned; never cloned out.
    rooms: HashMap<RoomId, Room>,
    /// How long a room must stay empty before deletion.
    empty_room_grace: Duration,
    /// Whether new rooms/joins are accepted.
    accepting_new: bool,
    /// Shared metrics.
    metrics: Arc<RegistryMetrics>,
}

impl RoomRegistryActor {
    /// Run the actor message loop.
    #[instrument(skip_all, name = "rc.registry", fields(node_id = %self.node_id))]
    async fn run(mut self) {
        info!(
            target: "rc.registry",
            node_id = %self.node_id,
            "RoomRegistryActor started"
        );

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "rc.registry",
                        node_id = %self.node_id,
                        "RoomRegistryActor received cancellation signal"
                    );
                    self.drain();
                    break;
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.handle_message(message);
                            self.metrics.record_event();
                        }
                        None => {
                            info!(
                                target: "rc.registry",
                                node_id = %self.node_id,
                                "RoomRegistryActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "rc.registry",
            node_id = %self.node_id,
            rooms_remaining = self.rooms.len(),
            events_processed = self.metrics.events_processed(),
            "RoomRegistryActor stopped"
        );
    }

    /// Handle a single message.
    fn handle_message(&mut self, message: RegistryMessage) {
        match message {
            RegistryMessage::CreateRoom { respond_to } => {
                let _ = respond_to.send(self.create_room());
            }

            RegistryMessage::GetRoomInfo {
                room_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.room_info(room_id));
            }

            RegistryMessage::JoinRoom {
                room_id,
                username,
                peer_id,
                wants_host,
                connection,
                respond_to,
            } => {
                let _ =
                    respond_to.send(self.join_room(room_id, username, peer_id, wants_host, connection));
            }

            RegistryMessage::ApproveParticipant {
                room_id,
                caller,
                participant_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.approve(room_id, caller, participant_id));
            }

            RegistryMessage::RejectParticipant {
                room_id,
                caller,
                participant_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.reject(room_id, caller, participant_id));
            }

            RegistryMessage::ListWaiting {
                room_id,
                caller,
                respond_to,
            } => {
                let _ = respond_to.send(self.list_waiting(room_id, caller));
            }

            RegistryMessage::ToggleMedia {
                room_id,
                caller,
                kind,
                enabled,
                respond_to,
            } => {
                let _ = respond_to.send(self.toggle_media(room_id, caller, kind, enabled));
            }

            RegistryMessage::RemoveParticipant {
                room_id,
                caller,
                participant_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.remove(room_id, caller, participant_id));
            }

            RegistryMessage::Disconnect {
                connection_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.disconnect(connection_id));
            }

            RegistryMessage::ReapRoom { room_id } => {
                self.reap(room_id);
            }

            RegistryMessage::GetStatus { respond_to } => {
                let _ = respond_to.send(RegistryStatus {
                    room_count: self.rooms.len(),
                    connection_count: self.metrics.connections_active(),
                    is_draining: !self.accepting_new,
                });
            }

            RegistryMessage::Shutdown { respond_to } => {
                let _ = respond_to.send(self.initiate_shutdown());
            }
        }
    }

    /// Allocate a new empty room.
    fn create_room(&mut self) -> Result<RoomId, RoomError> {
        if !self.accepting_new {
            return Err(RoomError::ShuttingDown);
        }

        let room_id = RoomId::new();
        self.rooms.insert(room_id, Room::new(room_id));
        self.metrics.room_created();

        info!(
            target: "rc.registry",
            room_id = %room_id,
            total_rooms = self.rooms.len(),
            "Room created"
        );

        Ok(room_id)
    }

    fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        self.rooms
            .get(&room_id)
            .map(Room::info)
            .ok_or(RoomError::RoomNotFound)
    }

    /// Handle an admission request.
    fn join_room(
        &mut self,
        room_id: RoomId,
        username: String,
        peer_id: String,
        wants_host: bool,
        connection: ConnectionHandle,
    ) -> Result<JoinOutcome, RoomError> {
        if !self.accepting_new {
            return Err(RoomError::ShuttingDown);
        }

        let connection_id = connection.connection_id();

        // A connection belongs to exactly one room at a time.
        if self.rooms.values().any(|r| r.contains(connection_id)) {
            return Err(RoomError::Conflict(
                "Connection is already in a room".to_string(),
            ));
        }

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Err(RoomError::RoomNotFound);
        };

        if wants_host || room.host_id.is_none() {
            // Host takeover: at most one participant carries the host
            // flag, so a displaced host is demoted and told.
            if let Some(previous_id) = room.host_id {
                if let Some(previous) = room.participants.get_mut(&previous_id) {
                    previous.is_host = false;
                    previous
                        .connection
                        .send(ServerEvent::HostStatus { is_host: false });
                    info!(
                        target: "rc.registry",
                        room_id = %room_id,
                        previous_host = %previous_id,
                        "Host slot taken over, previous host demoted"
                    );
                }
            }

            // Direct host admission. The roster is usually empty here,
            // but not when a previous host disconnected and left
            // members behind; send the actual current list.
            let participant = Participant::admit(username, peer_id, true, connection);
            room.host_id = Some(connection_id);
            room.host_peer_id = Some(participant.peer_id.clone());

            participant
                .connection
                .send(ServerEvent::HostStatus { is_host: true });
            participant.connection.send(ServerEvent::RoomParticipants {
                participants: room.roster_excluding(connection_id),
            });

            room.participants.insert(connection_id, participant);

            info!(
                target: "rc.registry",
                room_id = %room_id,
                connection_id = %connection_id,
                members = room.participants.len(),
                "Connection admitted as host"
            );

            Ok(JoinOutcome::Host)
        } else {
            connection.send(ServerEvent::WaitingForApproval {
                message: "Waiting for the host to let you in".to_string(),
            });

            let waiting = WaitingParticipant {
                id: connection_id,
                username,
                peer_id,
                connection,
            };

            if let Some(host) = room.host() {
                host.connection.send(ServerEvent::JoinRequest {
                    participant_id: connection_id,
                    username: waiting.username.clone(),
                    peer_id: waiting.peer_id.clone(),
                });
            }

            room.waiting.insert(connection_id, waiting);

            debug!(
                target: "rc.registry",
                room_id = %room_id,
                connection_id = %connection_id,
                waiting = room.waiting.len(),
                "Connection placed in waiting set"
            );

            Ok(JoinOutcome::Waiting)
        }
    }

    /// Host approval: move a candidate from waiting into the room.
    fn approve(
        &mut self,
        room_id: RoomId,
        caller: ConnectionId,
        participant_id: ConnectionId,
    ) -> Result<(), RoomError> {
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Err(RoomError::RoomNotFound);
        };

        if room.host_id != Some(caller) {
            return Err(RoomError::Unauthorized(
                "Only the host can approve participants".to_string(),
            ));
        }

        // Stale or duplicate approvals are no-ops.
        let Some(waiting) = room.waiting.remove(&participant_id) else {
            return Ok(());
        };

        let participant = Participant::admit(
            waiting.username,
            waiting.peer_id,
            false,
            waiting.connection,
        );
        let username = participant.username.clone();
        let peer_id = participant.peer_id.clone();

        room.participants.insert(participant_id, participant);

        if let Some(approved) = room.participants.get(&participant_id) {
            approved.connection.send(ServerEvent::ApprovalGranted);
            approved.connection.send(ServerEvent::RoomParticipants {
                participants: room.roster_excluding(participant_id),
            });
        }

        broadcast_except(
            room,
            participant_id,
            &ServerEvent::UserJoined {
                participant_id,
                username,
                peer_id,
            },
        );

        info!(
            target: "rc.registry",
            room_id = %room_id,
            participant_id = %participant_id,
            members = room.participants.len(),
            "Participant approved"
        );

        Ok(())
    }

    /// Host rejection: notify the candidate, then terminate it.
    fn reject(
        &mut self,
        room_id: RoomId,
        caller: ConnectionId,
        participant_id: ConnectionId,
    ) -> Result<(), RoomError> {
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Err(RoomError::RoomNotFound);
        };

        if room.host_id != Some(caller) {
            return Err(RoomError::Unauthorized(
                "Only the host can reject participants".to_string(),
            ));
        }

        let Some(waiting) = room.waiting.remove(&participant_id) else {
            return Ok(());
        };

        waiting.connection.send(ServerEvent::ApprovalRejected {
            message: "The host denied your request to join".to_string(),
        });
        waiting.connection.close();

        info!(
            target: "rc.registry",
            room_id = %room_id,
            participant_id = %participant_id,
            "Participant rejected"
        );

        Ok(())
    }

    /// Host-only waiting-set query, answered on the host's connection.
    fn list_waiting(&self, room_id: RoomId, caller: ConnectionId) -> Result<(), RoomError> {
        let Some(room) = self.rooms.get(&room_id) else {
            return Err(RoomError::RoomNotFound);
        };

        // Permissive read policy: unauthorized callers get nothing.
        if room.host_id != Some(caller) {
            return Ok(());
        }

        if let Some(host) = room.host() {
            host.connection.send(ServerEvent::WaitingParticipants {
                participants: room.waiting.values().map(WaitingParticipant::summary).collect(),
            });
        }

        Ok(())
    }

    /// Self media-state change. Non-members are silently ignored.
    fn toggle_media(
        &mut self,
        room_id: RoomId,
        caller: ConnectionId,
        kind: MediaKind,
        enabled: bool,
    ) -> Result<(), RoomError> {
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Ok(());
        };

        let Some(participant) = room.participants.get_mut(&caller) else {
            return Ok(());
        };

        let peer_id = participant.peer_id.clone();
        let event = match kind {
            MediaKind::Audio => {
                participant.audio_enabled = enabled;
                ServerEvent::UserToggleAudio {
                    participant_id: caller,
                    peer_id,
                    enabled,
                }
            }
            MediaKind::Video => {
                participant.video_enabled = enabled;
                ServerEvent::UserToggleVideo {
                    participant_id: caller,
                    peer_id,
                    enabled,
                }
            }
        };

        broadcast_except(room, caller, &event);

        Ok(())
    }

    /// Host-only eviction.
    fn remove(
        &mut self,
        room_id: RoomId,
        caller: ConnectionId,
        participant_id: ConnectionId,
    ) -> Result<(), RoomError> {
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Err(RoomError::RoomNotFound);
        };

        if room.host_id != Some(caller) {
            return Err(RoomError::Unauthorized(
                "Only the host can remove participants".to_string(),
            ));
        }

        // The host slot is tied to its participant record; hosts leave
        // by disconnecting, not by removing themselves.
        if room.host_id == Some(participant_id) {
            return Ok(());
        }

        let Some(target) = room.participants.remove(&participant_id) else {
            return Ok(());
        };

        target.connection.send(ServerEvent::YouWereRemoved);

        broadcast_except(
            room,
            participant_id,
            &ServerEvent::UserRemoved {
                participant_id,
                peer_id: target.peer_id.clone(),
            },
        );

        target.connection.close();

        info!(
            target: "rc.registry",
            room_id = %room_id,
            participant_id = %participant_id,
            "Participant removed by host"
        );

        Ok(())
    }

    /// Handle connection loss at any admission state.
    fn disconnect(&mut self, connection_id: ConnectionId) -> Result<(), RoomError> {
        // A connection belongs to at most one room.
        let Some(room_id) = self
            .rooms
            .iter()
            .find(|(_, room)| room.contains(connection_id))
            .map(|(id, _)| *id)
        else {
            return Ok(());
        };

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Ok(());
        };

        if room.host_id == Some(connection_id) {
            // Host loss: no automatic successor. The room becomes
            // host-less and the next joiner takes the slot.
            room.participants.remove(&connection_id);
            room.host_id = None;
            room.host_peer_id = None;

            for participant in room.participants.values() {
                participant.connection.send(ServerEvent::HostLeft);
            }

            info!(
                target: "rc.registry",
                room_id = %room_id,
                connection_id = %connection_id,
                remaining = room.participants.len(),
                "Host disconnected, host slot vacated"
            );
        } else if let Some(participant) = room.participants.remove(&connection_id) {
            broadcast_except(
                room,
                connection_id,
                &ServerEvent::UserLeft {
                    participant_id: connection_id,
                    peer_id: participant.peer_id.clone(),
                },
            );

            info!(
                target: "rc.registry",
                room_id = %room_id,
                connection_id = %connection_id,
                remaining = room.participants.len(),
                "Member disconnected"
            );
        } else {
            // Waiting entrants vanish silently; the host is not told.
            room.waiting.remove(&connection_id);

            debug!(
                target: "rc.registry",
                room_id = %room_id,
                connection_id = %connection_id,
                "Waiting entrant disconnected"
            );
        }

        if room.is_empty() {
            self.schedule_reap(room_id);
        }

        Ok(())
    }

    /// Schedule a deletion re-check after the grace period. The timer
    /// carries only the room id; emptiness is re-verified against
    /// current state at fire time, so overlapping timers are harmless.
    fn schedule_reap(&self, room_id: RoomId) {
        debug!(
            target: "rc.registry",
            room_id = %room_id,
            grace_seconds = self.empty_room_grace.as_secs(),
            "Room empty, scheduling deletion check"
        );

        let sender = self.self_sender.clone();
        let grace = self.empty_room_grace;
        let cancel = self.cancel_token.child_token();

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(grace) => {
                    let _ = sender.send(RegistryMessage::ReapRoom { room_id }).await;
                }
            }
        });
    }

    /// Grace-timer expiry: delete the room only if it still exists and
    /// is still fully empty. A join during the grace window makes this
    /// re-check fail, which implicitly cancels the pending deletion.
    fn reap(&mut self, room_id: RoomId) {
        match self.rooms.get(&room_id) {
            Some(room) if room.is_empty() => {
                self.rooms.remove(&room_id);
                self.metrics.room_deleted();
                info!(
                    target: "rc.registry",
                    room_id = %room_id,
                    total_rooms = self.rooms.len(),
                    "Empty room reaped"
                );
            }
            Some(_) => {
                debug!(
                    target: "rc.registry",
                    room_id = %room_id,
                    "Room repopulated during grace period, keeping"
                );
            }
            None => {
                // Already reaped by an earlier timer; deleting an
                // absent room is a no-op.
                debug!(
                    target: "rc.registry",
                    room_id = %room_id,
                    "Reap check for already-deleted room"
                );
            }
        }
    }

    /// Begin draining: refuse new work and force-close every connection.
    fn initiate_shutdown(&mut self) -> Result<(), RoomError> {
        info!(
            target: "rc.registry",
            node_id = %self.node_id,
            rooms = self.rooms.len(),
            "Initiating registry drain"
        );

        self.accepting_new = false;

        for room in self.rooms.values() {
            for participant in room.participants.values() {
                participant.connection.close();
            }
            for waiting in room.waiting.values() {
                waiting.connection.close();
            }
        }

        Ok(())
    }

    /// Final cleanup when the actor is cancelled.
    fn drain(&mut self) {
        self.accepting_new = false;

        for (room_id, room) in self.rooms.drain() {
            for participant in room.participants.values() {
                participant.connection.close();
            }
            for waiting in room.waiting.values() {
                waiting.connection.close();
            }
            debug!(
                target: "rc.registry",
                room_id = %room_id,
                "Room dropped during shutdown"
            );
        }
    }
}

/// Deliver an event to every admitted member except one.
fn broadcast_except(room: &Room, except: ConnectionId, event: &ServerEvent) {
    for participant in room.participants.values() {
        if participant.id != except {
            participant.connection.send(event.clone());
        }
    }
}
