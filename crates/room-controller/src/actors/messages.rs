//! Mailbox messages for the registry actor.
//!
//! Every message corresponds to one externally observable event: an API
//! request, a frame from a connection, a disconnect, or a reap-timer
//! expiry. The actor runs each to completion - mutation and fan-out
//! included - before taking the next.

use super::connection::ConnectionHandle;
use crate::errors::RoomError;
use room_protocol::{ConnectionId, MediaKind, RoomId, RoomInfo};
use tokio::sync::oneshot;

/// How a join request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Admitted directly with host authority.
    Host,
    /// Placed in the waiting set pending host approval.
    Waiting,
}

/// Registry status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStatus {
    pub room_count: usize,
    pub connection_count: u64,
    pub is_draining: bool,
}

/// Messages processed by the registry actor.
pub enum RegistryMessage {
    /// Allocate a new empty room.
    CreateRoom {
        respond_to: oneshot::Sender<Result<RoomId, RoomError>>,
    },
    /// Snapshot a room for the lifecycle API.
    GetRoomInfo {
        room_id: RoomId,
        respond_to: oneshot::Sender<Result<RoomInfo, RoomError>>,
    },
    /// Admission request from a connection.
    JoinRoom {
        room_id: RoomId,
        username: String,
        peer_id: String,
        wants_host: bool,
        connection: ConnectionHandle,
        respond_to: oneshot::Sender<Result<JoinOutcome, RoomError>>,
    },
    /// Host decision: admit a waiting candidate.
    ApproveParticipant {
        room_id: RoomId,
        caller: ConnectionId,
        participant_id: ConnectionId,
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Host decision: turn a waiting candidate away and close it.
    RejectParticipant {
        room_id: RoomId,
        caller: ConnectionId,
        participant_id: ConnectionId,
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Host-only query; the waiting set is delivered to the host's own
    /// connection, unauthorized callers get nothing.
    ListWaiting {
        room_id: RoomId,
        caller: ConnectionId,
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Self media-state change; silently ignored for non-members.
    ToggleMedia {
        room_id: RoomId,
        caller: ConnectionId,
        kind: MediaKind,
        enabled: bool,
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Host-only eviction of an admitted member.
    RemoveParticipant {
        room_id: RoomId,
        caller: ConnectionId,
        participant_id: ConnectionId,
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Connection loss, at any admission state.
    Disconnect {
        connection_id: ConnectionId,
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Grace-timer expiry; deletes the room only if still empty.
    ReapRoom { room_id: RoomId },
    /// Status snapshot.
    GetStatus {
        respond_to: oneshot::Sender<RegistryStatus>,
    },
    /// Stop admitting new work and cancel all connections.
    Shutdown {
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },
}
