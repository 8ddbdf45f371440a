//! Room lifecycle HTTP API and application router.
//!
//! Two endpoints plus the WebSocket upgrade:
//!
//! - `POST /api/rooms` - allocate a room, returns its id
//! - `GET /api/rooms/:room_id` - inspect a room
//! - `GET /ws` - real-time event connection
//!
//! Room ids are unguessable UUIDs and knowing one is the only
//! precondition for attempting to join; admission control proper
//! happens at the host, not here.

use crate::actors::{RegistryMetrics, RoomRegistryHandle};
use crate::errors::RoomError;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use room_protocol::{RoomCreated, RoomId, RoomInfo};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared state for the application router.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the room registry actor.
    pub registry: RoomRegistryHandle,
    /// Shared registry metrics.
    pub metrics: Arc<RegistryMetrics>,
    /// Outbound event buffer size per connection.
    pub event_buffer: usize,
}

/// JSON error body returned by the lifecycle API.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// `RoomError` as an HTTP response.
pub struct ApiError(RoomError);

impl From<RoomError> for ApiError {
    fn from(err: RoomError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RoomError::RoomNotFound => StatusCode::NOT_FOUND,
            RoomError::Unauthorized(_) => StatusCode::FORBIDDEN,
            RoomError::Conflict(_) => StatusCode::CONFLICT,
            RoomError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            RoomError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.0.client_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Registry status body for `GET /api/status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    room_count: usize,
    connection_count: u64,
    is_draining: bool,
}

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/api/rooms", post(create_room_handler))
        .route("/api/rooms/:room_id", get(get_room_handler))
        .route("/api/status", get(status_handler))
        .route("/ws", get(crate::ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `POST /api/rooms` - allocate a new empty room.
async fn create_room_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<RoomCreated>), ApiError> {
    let room_id = state.registry.create_room().await?;
    Ok((StatusCode::CREATED, Json(RoomCreated { room_id })))
}

/// `GET /api/rooms/:room_id` - snapshot one room.
async fn get_room_handler(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomInfo>, ApiError> {
    let info = state.registry.room_info(RoomId(room_id)).await?;
    Ok(Json(info))
}

/// `GET /api/status` - instance-level counters for operators.
async fn status_handler(State(state): State<AppState>) -> Result<Json<StatusBody>, ApiError> {
    let status = state.registry.status().await?;
    Ok(Json(StatusBody {
        room_count: status.room_count,
        connection_count: status.connection_count,
        is_draining: status.is_draining,
    }))
}
