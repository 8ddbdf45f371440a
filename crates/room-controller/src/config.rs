//! Room Controller configuration.
//!
//! Configuration is loaded from environment variables. Everything has a
//! sensible default; the service starts with no environment at all.

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default bind address for the API + WebSocket server.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default bind address for health probes and metrics.
pub const DEFAULT_HEALTH_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Default grace period before an empty room is deleted, in seconds.
pub const DEFAULT_EMPTY_ROOM_GRACE_SECONDS: u64 = 60;

/// Default per-connection outbound event buffer.
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Default node ID prefix.
pub const DEFAULT_NODE_ID_PREFIX: &str = "rc";

/// Room Controller configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API + WebSocket bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Health/metrics bind address (default: "0.0.0.0:8081").
    pub health_bind_address: String,

    /// Unique identifier for this instance.
    pub node_id: String,

    /// Grace period before an empty room is deleted (default: 60s).
    pub empty_room_grace_seconds: u64,

    /// Per-connection outbound event buffer (default: 64).
    pub event_buffer: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("RC_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let health_bind_address = vars
            .get("RC_HEALTH_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_HEALTH_BIND_ADDRESS.to_string());

        let empty_room_grace_seconds = parse_or_default(
            vars,
            "RC_EMPTY_ROOM_GRACE_SECONDS",
            DEFAULT_EMPTY_ROOM_GRACE_SECONDS,
        )?;

        let event_buffer = parse_or_default(vars, "RC_EVENT_BUFFER", DEFAULT_EVENT_BUFFER)?;

        // Generate a node ID unless one is pinned via the environment
        let node_id = vars.get("RC_NODE_ID").cloned().unwrap_or_else(|| {
            let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());
            let uuid_suffix = uuid::Uuid::new_v4().to_string();
            let short_suffix = uuid_suffix.get(..8).unwrap_or("00000000");
            format!("{DEFAULT_NODE_ID_PREFIX}-{hostname}-{short_suffix}")
        });

        Ok(Config {
            bind_address,
            health_bind_address,
            node_id,
            empty_room_grace_seconds,
            event_buffer,
        })
    }

    /// The empty-room grace period as a [`Duration`].
    #[must_use]
    pub fn empty_room_grace(&self) -> Duration {
        Duration::from_secs(self.empty_room_grace_seconds)
    }
}

fn parse_or_default<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("Config should load");

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.health_bind_address, DEFAULT_HEALTH_BIND_ADDRESS);
        assert_eq!(
            config.empty_room_grace_seconds,
            DEFAULT_EMPTY_ROOM_GRACE_SECONDS
        );
        assert_eq!(config.event_buffer, DEFAULT_EVENT_BUFFER);
        assert!(config.node_id.starts_with("rc-"));
    }

    #[test]
    fn test_from_vars_custom_values() {
        let vars = HashMap::from([
            ("RC_BIND_ADDRESS".to_string(), "127.0.0.1:9090".to_string()),
            (
                "RC_HEALTH_BIND_ADDRESS".to_string(),
                "127.0.0.1:9091".to_string(),
            ),
            ("RC_EMPTY_ROOM_GRACE_SECONDS".to_string(), "5".to_string()),
            ("RC_EVENT_BUFFER".to_string(), "16".to_string()),
            ("RC_NODE_ID".to_string(), "rc-custom-001".to_string()),
        ]);

        let config = Config::from_vars(&vars).expect("Config should load");

        assert_eq!(config.bind_address, "127.0.0.1:9090");
        assert_eq!(config.health_bind_address, "127.0.0.1:9091");
        assert_eq!(config.empty_room_grace_seconds, 5);
        assert_eq!(config.empty_room_grace(), Duration::from_secs(5));
        assert_eq!(config.event_buffer, 16);
        assert_eq!(config.node_id, "rc-custom-001");
    }

    #[test]
    fn test_from_vars_rejects_unparseable_numbers() {
        let vars = HashMap::from([(
            "RC_EMPTY_ROOM_GRACE_SECONDS".to_string(),
            "soon".to_string(),
        )]);

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "RC_EMPTY_ROOM_GRACE_SECONDS")
        );
    }
}
