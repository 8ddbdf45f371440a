//! The bidirectional real-time event protocol.
//!
//! Direction is client-relative: [`ClientEvent`] frames arrive from a
//! connection, [`ServerEvent`] frames are delivered to it. Events are
//! scoped to one room after joining; the `roomId` on inbound frames
//! names which one.

use crate::types::{ConnectionId, RoomId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which media track a toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

/// One admitted member, as carried in roster snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub username: String,
    pub peer_id: String,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub is_host: bool,
}

/// One pending admission, as returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingSummary {
    pub participant_id: ConnectionId,
    pub username: String,
    pub peer_id: String,
}

/// Frames a connection may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Admission request. `isHost` is advisory: the first joiner of a
    /// host-less room is admitted as host regardless.
    JoinRoom {
        room_id: RoomId,
        username: String,
        peer_id: String,
        #[serde(default)]
        is_host: bool,
    },
    /// Host decision: move a waiting candidate into the room.
    ApproveParticipant {
        room_id: RoomId,
        participant_id: ConnectionId,
    },
    /// Host decision: turn a waiting candidate away.
    RejectParticipant {
        room_id: RoomId,
        participant_id: ConnectionId,
    },
    ToggleAudio {
        room_id: RoomId,
        peer_id: String,
        enabled: bool,
    },
    ToggleVideo {
        room_id: RoomId,
        peer_id: String,
        enabled: bool,
    },
    /// Host-only eviction of an admitted member.
    RemoveParticipant {
        room_id: RoomId,
        participant_id: ConnectionId,
        peer_id: String,
    },
    /// Host-only query of the waiting set.
    GetWaitingParticipants { room_id: RoomId },
    /// Liveness probe, answered with [`ServerEvent::Pong`].
    Ping,
}

/// Frames delivered to a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// The referenced room does not exist, or the request was not
    /// permitted; terminal for that attempt only.
    RoomError { message: String },
    /// Confirms host admission.
    HostStatus { is_host: bool },
    /// The candidate is pending host approval.
    WaitingForApproval { message: String },
    /// Sent to the host only: a candidate wants in.
    JoinRequest {
        participant_id: ConnectionId,
        username: String,
        peer_id: String,
    },
    /// Sent to an approved candidate.
    ApprovalGranted,
    /// Initial roster snapshot, excluding the recipient.
    RoomParticipants {
        participants: HashMap<ConnectionId, ParticipantSummary>,
    },
    /// Broadcast to existing members when a candidate is admitted.
    UserJoined {
        participant_id: ConnectionId,
        username: String,
        peer_id: String,
    },
    /// Sent to a rejected candidate; its connection is closed after.
    ApprovalRejected { message: String },
    UserToggleAudio {
        participant_id: ConnectionId,
        peer_id: String,
        enabled: bool,
    },
    UserToggleVideo {
        participant_id: ConnectionId,
        peer_id: String,
        enabled: bool,
    },
    /// Sent to an evicted member; its connection is closed after.
    YouWereRemoved,
    /// Broadcast to remaining members after an eviction.
    UserRemoved {
        participant_id: ConnectionId,
        peer_id: String,
    },
    /// Host-only response to `get-waiting-participants`.
    WaitingParticipants { participants: Vec<WaitingSummary> },
    /// Broadcast to all members when the host disconnects.
    HostLeft,
    /// Broadcast when a non-host member disconnects.
    UserLeft {
        participant_id: ConnectionId,
        peer_id: String,
    },
    Pong,
}
