//! Per-connection handle.
//!
//! One `ConnectionHandle` exists per live WebSocket connection. The
//! registry actor stores a clone inside the room the connection belongs
//! to and uses it to fan events out; the WebSocket task in [`crate::ws`]
//! drains the paired receiver and writes frames to the socket.
//!
//! Delivery is best-effort and non-blocking: the registry must never
//! stall on a slow or dead client, so events to a full or closed channel
//! are dropped.

use room_protocol::{ConnectionId, ServerEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to one live connection.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    connection_id: ConnectionId,
    sender: mpsc::Sender<ServerEvent>,
    cancel_token: CancellationToken,
}

impl ConnectionHandle {
    /// Open a new connection handle with an outbound event buffer of
    /// `buffer` events. Returns the handle and the receiving end the
    /// transport task drains.
    #[must_use]
    pub fn open(
        connection_id: ConnectionId,
        buffer: usize,
        cancel_token: CancellationToken,
    ) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (
            Self {
                connection_id,
                sender,
                cancel_token,
            },
            receiver,
        )
    }

    /// Get the connection ID.
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Queue an event for delivery to the client, best-effort.
    pub fn send(&self, event: ServerEvent) {
        if let Err(err) = self.sender.try_send(event) {
            debug!(
                target: "rc.connection",
                connection_id = %self.connection_id,
                error = %err,
                "Dropping event for unreachable connection"
            );
        }
    }

    /// Forcibly terminate the connection. The transport task observes
    /// the cancellation, flushes already-queued events and closes the
    /// socket. Terminal and immediate; there is no handshake.
    pub fn close(&self) {
        self.cancel_token.cancel();
    }

    /// Whether the connection has been force-closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Wait for the connection to be force-closed.
    pub async fn closed(&self) {
        self.cancel_token.cancelled().await;
    }
}
