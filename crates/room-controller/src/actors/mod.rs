//! Actor system for room membership.
//!
//! A single [`registry::RoomRegistryActor`] owns every room and
//! serializes all mutations through its mailbox. Connections are
//! represented by lightweight [`connection::ConnectionHandle`]s; the
//! WebSocket task in [`crate::ws`] is the per-connection event loop.

pub mod connection;
pub mod messages;
pub mod metrics;
pub mod registry;
pub mod room;

pub use connection::ConnectionHandle;
pub use messages::{JoinOutcome, RegistryStatus};
pub use metrics::RegistryMetrics;
pub use registry::RoomRegistryHandle;
