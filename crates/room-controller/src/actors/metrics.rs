//! Registry metrics.
//!
//! Plain atomics for cheap in-process reads (status endpoint, tests)
//! plus `metrics` facade counters/gauges rendered by the Prometheus
//! exporter installed in `main.rs`.

use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared counters for the registry and its connections.
#[derive(Debug, Default)]
pub struct RegistryMetrics {
    rooms_created: AtomicU64,
    rooms_reaped: AtomicU64,
    rooms_active: AtomicU64,
    connections_active: AtomicU64,
    events_processed: AtomicU64,
}

impl RegistryMetrics {
    /// Create new shared metrics.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn room_created(&self) {
        self.rooms_created.fetch_add(1, Ordering::Relaxed);
        self.rooms_active.fetch_add(1, Ordering::Relaxed);
        counter!("rc_rooms_created_total").increment(1);
        gauge!("rc_rooms_active").increment(1.0);
    }

    pub fn room_deleted(&self) {
        self.rooms_reaped.fetch_add(1, Ordering::Relaxed);
        self.rooms_active.fetch_sub(1, Ordering::Relaxed);
        counter!("rc_rooms_reaped_total").increment(1);
        gauge!("rc_rooms_active").decrement(1.0);
    }

    pub fn connection_opened(&self) {
        self.connections_active.fetch_add(1, Ordering::Relaxed);
        gauge!("rc_connections_active").increment(1.0);
    }

    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
        gauge!("rc_connections_active").decrement(1.0);
    }

    pub fn record_event(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
        counter!("rc_registry_events_total").increment(1);
    }

    #[must_use]
    pub fn rooms_created(&self) -> u64 {
        self.rooms_created.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn rooms_active(&self) -> u64 {
        self.rooms_active.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn connections_active(&self) -> u64 {
        self.connections_active.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn rooms_reaped(&self) -> u64 {
        self.rooms_reaped.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn events_processed(&self) -> u64 {
        self.events_processed.load(Ordering::Relaxed)
    }
}
