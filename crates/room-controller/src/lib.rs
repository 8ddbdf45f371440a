//! Room Controller Service Library
//!
//! A stateful WebSocket signaling server that arbitrates who is allowed
//! to be "in" a room and relays presence/control events between admitted
//! members. Media transport itself is delegated to an external
//! peer-connection layer; this service only coordinates membership:
//!
//! - Waiting-room admission gated by a per-room host
//! - Host authority and its loss on disconnect (no auto-succession)
//! - Presence/control event fan-out (join, leave, media toggles, removal)
//! - Deferred garbage collection of empty rooms with re-validation
//!
//! # Architecture
//!
//! All room state is owned by a single `RoomRegistryActor`:
//!
//! ```text
//! RoomRegistryActor (singleton per instance)
//! ├── owns the room table (rooms, members, waiting sets, host slots)
//! ├── processes one event at a time (mutation + fan-out are atomic)
//! └── grace timers re-enter its mailbox as ordinary ReapRoom events
//! ```
//!
//! Every inbound event - join, approve, reject, toggle, remove,
//! disconnect, reap-timer expiry - funnels through the actor's mailbox,
//! so no two mutations of the same room ever interleave and the reaper's
//! emptiness re-check is race-free by construction.
//!
//! # Modules
//!
//! - [`actors`] - the registry actor, room data model and connection handles
//! - [`api`] - room CRUD API and WebSocket route
//! - [`ws`] - per-connection WebSocket event loop
//! - [`config`] - service configuration from environment
//! - [`errors`] - error types with client-safe messages
//! - [`observability`] - health probes and the Prometheus endpoint

pub mod actors;
pub mod api;
pub mod config;
pub mod errors;
pub mod observability;
pub mod ws;
