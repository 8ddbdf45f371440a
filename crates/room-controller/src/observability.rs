//! Health and metrics endpoints.
//!
//! Served on a separate listener from the application router so probes
//! keep answering while the app port drains:
//!
//! - `GET /healthz` - liveness probe (is the process running?)
//! - `GET /readyz` - readiness probe (can we serve traffic?)
//! - `GET /metrics` - Prometheus text exposition

use axum::{extract::State, http::StatusCode, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness and readiness flags for the probe endpoints.
#[derive(Debug)]
pub struct HealthState {
    /// Always true after startup (process is running).
    live: AtomicBool,
    /// True while the registry accepts new rooms and joins.
    ready: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create a new health state (live=true, ready=false).
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: AtomicBool::new(true),
            ready: AtomicBool::new(false),
        }
    }

    /// Mark the service as ready to serve traffic.
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Mark the service as not ready (e.g., during shutdown).
    pub fn set_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    /// Check if the service is live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Check if the service is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Build the health router.
///
/// * `health_state` - shared probe flags
/// * `prometheus` - handle rendering the process-wide metrics registry
pub fn health_router(health_state: Arc<HealthState>, prometheus: PrometheusHandle) -> Router {
    Router::new()
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route(
            "/metrics",
            get(move || {
                let prometheus = prometheus.clone();
                async move { prometheus.render() }
            }),
        )
        .with_state(health_state)
}

/// Liveness probe handler. A failing probe means restart the process.
async fn liveness_handler(State(state): State<Arc<HealthState>>) -> StatusCode {
    if state.is_live() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Readiness probe handler. 503 while starting up or draining.
async fn readiness_handler(State(state): State<Arc<HealthState>>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::util::ServiceExt;

    fn test_router(state: Arc<HealthState>) -> Router {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        health_router(state, handle)
    }

    #[test]
    fn test_health_state_default() {
        let state = HealthState::new();
        assert!(state.is_live());
        assert!(!state.is_ready());
    }

    #[test]
    fn test_health_state_ready_transitions() {
        let state = HealthState::new();

        state.set_ready();
        assert!(state.is_ready());

        state.set_not_ready();
        assert!(!state.is_ready());
    }

    #[tokio::test]
    async fn test_liveness_endpoint_returns_ok() {
        let app = test_router(Arc::new(HealthState::new()));

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_endpoint_tracks_state() {
        let state = Arc::new(HealthState::new());

        let response = test_router(Arc::clone(&state))
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.set_ready();
        let response = test_router(Arc::clone(&state))
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_renders_exposition() {
        let app = test_router(Arc::new(HealthState::new()));

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
