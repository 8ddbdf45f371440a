//! Request/response bodies for the room lifecycle API.

use crate::types::RoomId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response to room creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreated {
    pub room_id: RoomId,
}

/// Per-participant slice of the room info response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomParticipantInfo {
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub is_host: bool,
}

/// Snapshot of a room for external consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub participant_count: usize,
    pub waiting_count: usize,
    pub has_host: bool,
    pub participants: Vec<RoomParticipantInfo>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_room_info_wire_shape() {
        let info = RoomInfo {
            room_id: RoomId::new(),
            participant_count: 1,
            waiting_count: 2,
            has_host: true,
            participants: vec![RoomParticipantInfo {
                username: "ada".to_string(),
                joined_at: Utc::now(),
                is_host: true,
            }],
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains(r#""participantCount":1"#));
        assert!(json.contains(r#""waitingCount":2"#));
        assert!(json.contains(r#""hasHost":true"#));
        assert!(json.contains(r#""joinedAt""#));

        let back: RoomInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
