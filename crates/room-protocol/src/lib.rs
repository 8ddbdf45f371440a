//! Wire types for the room controller.
//!
//! The real-time protocol is JSON over WebSocket: every frame is a
//! tagged object with a `type` field and camelCase payload fields.
//! Modeling the frames as enums means malformed payloads are rejected
//! at the edge instead of being trusted by shape.
//!
//! # Modules
//!
//! - [`types`] - identifier newtypes shared by all surfaces
//! - [`events`] - the bidirectional real-time event protocol
//! - [`api`] - request/response bodies for the room CRUD API

#![warn(clippy::pedantic)]

pub mod api;
pub mod events;
pub mod types;

pub use api::{RoomCreated, RoomInfo, RoomParticipantInfo};
pub use events::{ClientEvent, MediaKind, ParticipantSummary, ServerEvent, WaitingSummary};
pub use types::{ConnectionId, RoomId};
