//! Room Controller
//!
//! Stateful WebSocket signaling server coordinating room membership,
//! waiting-room admission and presence fan-out.
//!
//! # Servers
//!
//! - Application HTTP server: room lifecycle API + `/ws` (default: 0.0.0.0:8080)
//! - Health HTTP server: probes + Prometheus metrics (default: 0.0.0.0:8081)
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Install the Prometheus metrics recorder
//! 3. Spawn the `RoomRegistryActor`
//! 4. Start the health server (liveness, readiness, metrics)
//! 5. Start the application server
//! 6. Wait for shutdown signal, then drain and cancel

#![warn(clippy::pedantic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use room_controller::actors::{RegistryMetrics, RoomRegistryHandle};
use room_controller::api::{app_router, AppState};
use room_controller::config::Config;
use room_controller::observability::{health_router, HealthState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "room_controller=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Room Controller");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        node_id = %config.node_id,
        bind_address = %config.bind_address,
        health_bind_address = %config.health_bind_address,
        empty_room_grace_seconds = config.empty_room_grace_seconds,
        event_buffer = config.event_buffer,
        "Configuration loaded successfully"
    );

    // Install the Prometheus recorder before any metrics are recorded
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus metrics recorder")?;

    let health_state = Arc::new(HealthState::new());

    // Spawn the registry actor
    let metrics = RegistryMetrics::new();
    let registry = RoomRegistryHandle::new(
        config.node_id.clone(),
        config.empty_room_grace(),
        Arc::clone(&metrics),
    );
    info!("Room registry actor started");

    // All server tasks are cancelled when the registry shuts down
    let shutdown_token = registry.child_token();

    // Start the health server; bind before spawning to fail fast
    let health_addr: SocketAddr = config
        .health_bind_address
        .parse()
        .with_context(|| format!("Invalid health bind address: {}", config.health_bind_address))?;

    let health_app = health_router(Arc::clone(&health_state), prometheus_handle);
    let health_listener = tokio::net::TcpListener::bind(health_addr)
        .await
        .with_context(|| format!("Failed to bind health server to {health_addr}"))?;

    let health_shutdown_token = shutdown_token.child_token();
    tokio::spawn(async move {
        info!(addr = %health_addr, "Health server starting");
        let server = axum::serve(health_listener, health_app).with_graceful_shutdown(async move {
            health_shutdown_token.cancelled().await;
            info!("Health server shutting down");
        });
        if let Err(e) = server.await {
            error!(error = %e, "Health server failed");
        }
    });

    // Start the application server
    let app_addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.bind_address))?;

    let app = app_router(AppState {
        registry: registry.clone(),
        metrics: Arc::clone(&metrics),
        event_buffer: config.event_buffer,
    });

    let app_listener = tokio::net::TcpListener::bind(app_addr)
        .await
        .with_context(|| format!("Failed to bind application server to {app_addr}"))?;

    let app_shutdown_token = shutdown_token.child_token();
    tokio::spawn(async move {
        info!(addr = %app_addr, "Application server starting");
        let server = axum::serve(app_listener, app).with_graceful_shutdown(async move {
            app_shutdown_token.cancelled().await;
            info!("Application server shutting down");
        });
        if let Err(e) = server.await {
            error!(error = %e, "Application server failed");
        }
    });

    health_state.set_ready();
    info!("Room Controller running - press Ctrl+C to shutdown");

    shutdown_signal().await;
    info!("Shutdown signal received, initiating graceful shutdown...");

    // Stop taking traffic first, then drain the registry
    health_state.set_not_ready();

    if let Err(e) = registry.shutdown().await {
        warn!(error = %e, "Registry drain error");
    }

    // Give connection tasks time to flush close frames
    tokio::time::sleep(Duration::from_secs(2)).await;

    registry.cancel();

    info!("Room Controller shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed. This is acceptable because
/// without signal handlers, we cannot gracefully shut down the service.
async fn shutdown_signal() {
    let ctrl_c = async {
        #[expect(
            clippy::expect_used,
            reason = "Signal handler installation is critical - panic is appropriate if it fails"
        )]
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        #[expect(
            clippy::expect_used,
            reason = "Signal handler installation is critical - panic is appropriate if it fails"
        )]
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
