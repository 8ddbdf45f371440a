//! Room Controller error types.
//!
//! All failures are scoped to a single connection or request; there is
//! no category of fatal, process-ending error in the core. Stale or
//! duplicate approve/reject/toggle requests are deliberately *not*
//! errors - they are silent no-ops so that client retries stay harmless.

use thiserror::Error;

/// Room Controller error type.
#[derive(Debug, Error)]
pub enum RoomError {
    /// The referenced room does not exist.
    #[error("Room not found")]
    RoomNotFound,

    /// A non-host attempted a host-only action.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Conflicting request (e.g., a connection joining twice).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The service is draining and no longer admits new work.
    #[error("Shutting down")]
    ShuttingDown,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoomError {
    /// Returns a client-safe error message (no internal details).
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            RoomError::RoomNotFound => "Room not found".to_string(),
            RoomError::Unauthorized(msg) | RoomError::Conflict(msg) => msg.clone(),
            RoomError::ShuttingDown => "Server is shutting down, please retry later".to_string(),
            RoomError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_hide_internal_details() {
        let err = RoomError::Internal("mailbox send failed: channel closed".to_string());
        assert_eq!(err.client_message(), "An internal error occurred");
        assert!(!err.client_message().contains("mailbox"));
    }

    #[test]
    fn test_unauthorized_message_passes_through() {
        let err = RoomError::Unauthorized("Only the host can approve participants".to_string());
        assert_eq!(
            err.client_message(),
            "Only the host can approve participants"
        );
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(format!("{}", RoomError::RoomNotFound), "Room not found");
        assert_eq!(
            format!("{}", RoomError::Internal("oops".to_string())),
            "Internal error: oops"
        );
    }
}
