//! Room and participant data model.
//!
//! Rooms are plain data owned exclusively by the registry actor; no
//! other component ever holds a copy that could diverge. Two invariants
//! hold at every mailbox-event boundary:
//!
//! - the `participants` and `waiting` key sets are disjoint
//! - at most one participant has `is_host = true`, and exactly when
//!   `host_id` names it

use super::connection::ConnectionHandle;
use chrono::{DateTime, Utc};
use room_protocol::{
    ConnectionId, ParticipantSummary, RoomId, RoomInfo, RoomParticipantInfo, WaitingSummary,
};
use std::collections::{HashMap, HashSet};

/// An admitted member of a room.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ConnectionId,
    pub username: String,
    pub peer_id: String,
    /// Timestamp of admission, not of connection.
    pub joined_at: DateTime<Utc>,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub is_host: bool,
    pub connection: ConnectionHandle,
}

impl Participant {
    /// Admit a connection; media flags default to enabled.
    pub fn admit(
        username: String,
        peer_id: String,
        is_host: bool,
        connection: ConnectionHandle,
    ) -> Self {
        Self {
            id: connection.connection_id(),
            username,
            peer_id,
            joined_at: Utc::now(),
            audio_enabled: true,
            video_enabled: true,
            is_host,
            connection,
        }
    }

    pub fn summary(&self) -> ParticipantSummary {
        ParticipantSummary {
            username: self.username.clone(),
            peer_id: self.peer_id.clone(),
            audio_enabled: self.audio_enabled,
            video_enabled: self.video_enabled,
            is_host: self.is_host,
        }
    }

    fn info(&self) -> RoomParticipantInfo {
        RoomParticipantInfo {
            username: self.username.clone(),
            joined_at: self.joined_at,
            is_host: self.is_host,
        }
    }
}

/// A pending admission: identity only, no media or host state yet.
#[derive(Debug, Clone)]
pub struct WaitingParticipant {
    pub id: ConnectionId,
    pub username: String,
    pub peer_id: String,
    pub connection: ConnectionHandle,
}

impl WaitingParticipant {
    pub fn summary(&self) -> WaitingSummary {
        WaitingSummary {
            participant_id: self.id,
            username: self.username.clone(),
            peer_id: self.peer_id.clone(),
        }
    }
}

/// Per-room settings.
///
/// `require_approval` is reserved for a future bypass path and
/// `allowed_to_join` is not consulted by the admission algorithm; both
/// are carried so external tooling can read and round-trip them.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub require_approval: bool,
    pub allowed_to_join: HashSet<String>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            require_approval: true,
            allowed_to_join: HashSet::new(),
        }
    }
}

/// One bounded membership domain.
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    /// Admitted members by connection id.
    pub participants: HashMap<ConnectionId, Participant>,
    /// Pending admissions by connection id; disjoint from `participants`.
    pub waiting: HashMap<ConnectionId, WaitingParticipant>,
    /// Connection currently holding host authority, if any.
    pub host_id: Option<ConnectionId>,
    /// The host's peer id, cached for external consumers; vacant iff
    /// `host_id` is vacant.
    pub host_peer_id: Option<String>,
    pub settings: RoomSettings,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            participants: HashMap::new(),
            waiting: HashMap::new(),
            host_id: None,
            host_peer_id: None,
            settings: RoomSettings::default(),
            created_at: Utc::now(),
        }
    }

    /// Both sets empty: eligible for deletion after the grace period.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.waiting.is_empty()
    }

    /// Whether the connection is a member or a waiting entrant here.
    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.participants.contains_key(&connection_id) || self.waiting.contains_key(&connection_id)
    }

    /// The participant currently holding host authority, if any.
    pub fn host(&self) -> Option<&Participant> {
        self.host_id.and_then(|id| self.participants.get(&id))
    }

    /// Roster snapshot excluding one connection (its own view).
    pub fn roster_excluding(
        &self,
        excluded: ConnectionId,
    ) -> HashMap<ConnectionId, ParticipantSummary> {
        self.participants
            .values()
            .filter(|p| p.id != excluded)
            .map(|p| (p.id, p.summary()))
            .collect()
    }

    /// Snapshot for the room lifecycle API.
    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.id,
            participant_count: self.participants.len(),
            waiting_count: self.waiting.len(),
            has_host: self.host_id.is_some(),
            participants: self.participants.values().map(Participant::info).collect(),
        }
    }
}
