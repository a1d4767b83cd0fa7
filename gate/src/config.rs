//! Configuration management for the gate.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Values that fail to parse fall back to their default.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use ticket_gate_core::{ContractAddress, IdentityError, NetworkId, RetryPolicy, VenueContext};

/// Contract address of the demo venue.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x25b2C2eaf9b8EC899d9cd44Ac74001eF17180F14";

/// Network id of the demo venue (Base Sepolia).
pub const DEFAULT_NETWORK_ID: &str = "84532";

/// Gate configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Which tickets this gate admits
    pub venue: VenueConfig,
    /// Ticket registry backend
    pub registry: RegistryConfig,
    /// Registry lookup retries
    pub retry: RetryConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Code reader used by the console
    pub scanner: ScannerConfig,
}

/// Venue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Contract issuing this venue's tickets
    pub contract_address: String,
    /// Network the contract lives on
    pub network_id: String,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// `PostgreSQL` connection URL. Without one the gate keeps tickets in memory.
    pub database_url: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
    /// Issue the demo tickets at startup
    pub seed_demo: bool,
}

/// Retry configuration for registry lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound on the delay, in milliseconds
    pub max_delay_ms: u64,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Serve Prometheus metrics
    pub metrics_enabled: bool,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Line-emitting code reader (a tty or a FIFO). Without one the console
    /// only accepts typed input.
    pub device: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| Parsed(lookup(key));

        Self {
            venue: VenueConfig {
                contract_address: lookup("GATE_CONTRACT_ADDRESS")
                    .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string()),
                network_id: lookup("GATE_NETWORK_ID")
                    .unwrap_or_else(|| DEFAULT_NETWORK_ID.to_string()),
            },
            registry: RegistryConfig {
                database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
                max_connections: parsed("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
                connect_timeout: parsed("DATABASE_CONNECT_TIMEOUT").unwrap_or(30),
                seed_demo: parsed("GATE_SEED_DEMO").unwrap_or(false),
            },
            retry: RetryConfig {
                max_retries: parsed("GATE_RETRY_MAX").unwrap_or(2),
                initial_delay_ms: parsed("GATE_RETRY_INITIAL_MS").unwrap_or(100),
                max_delay_ms: parsed("GATE_RETRY_MAX_DELAY_MS").unwrap_or(2_000),
            },
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed("PORT").unwrap_or(8080),
                metrics_enabled: parsed("METRICS_ENABLED").unwrap_or(false),
                metrics_host: lookup("METRICS_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                metrics_port: parsed("METRICS_PORT").unwrap_or(9090),
                shutdown_timeout: parsed("SHUTDOWN_TIMEOUT").unwrap_or(10),
            },
            scanner: ScannerConfig {
                device: lookup("GATE_SCANNER_DEVICE")
                    .filter(|path| !path.trim().is_empty())
                    .map(PathBuf::from),
            },
        }
    }

    /// The venue this gate admits tickets for.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the configured contract address or
    /// network id is not a valid scan code field.
    pub fn venue(&self) -> Result<VenueContext, IdentityError> {
        Ok(VenueContext::new(
            ContractAddress::parse(self.venue.contract_address.as_str())?,
            NetworkId::parse(self.venue.network_id.as_str())?,
        ))
    }

    /// Retry policy for registry lookups.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.retry.max_retries)
            .initial_delay(Duration::from_millis(self.retry.initial_delay_ms))
            .max_delay(Duration::from_millis(self.retry.max_delay_ms))
            .build()
    }

    /// HTTP bind address as `host:port`.
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Metrics bind address as `host:port`.
    #[must_use]
    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.server.metrics_host, self.server.metrics_port)
    }
}

/// Raw variable value, parsed on demand into whatever type the field needs.
struct Parsed(Option<String>);

impl Parsed {
    fn unwrap_or<T: FromStr>(self, default: T) -> T {
        self.0.and_then(|s| s.parse().ok()).unwrap_or(default)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.venue.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(config.venue.network_id, DEFAULT_NETWORK_ID);
        assert!(config.registry.database_url.is_none());
        assert!(!config.registry.seed_demo);
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert!(!config.server.metrics_enabled);
        assert!(config.scanner.device.is_none());
        assert_eq!(config.retry_policy().max_retries, 2);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GATE_CONTRACT_ADDRESS", "0xabc"),
            ("GATE_NETWORK_ID", "1"),
            ("DATABASE_URL", "postgres://localhost/tickets"),
            ("GATE_SEED_DEMO", "true"),
            ("PORT", "3000"),
            ("METRICS_ENABLED", "true"),
            ("GATE_RETRY_MAX", "0"),
            ("GATE_SCANNER_DEVICE", "/dev/ttyACM0"),
        ]);

        assert_eq!(
            config.registry.database_url.as_deref(),
            Some("postgres://localhost/tickets")
        );
        assert!(config.registry.seed_demo);
        assert_eq!(config.server.port, 3000);
        assert!(config.server.metrics_enabled);
        assert_eq!(config.retry_policy().max_retries, 0);
        assert_eq!(config.scanner.device, Some(PathBuf::from("/dev/ttyACM0")));

        let venue = config.venue().unwrap();
        assert_eq!(venue.contract_address.as_str(), "0xabc");
        assert_eq!(venue.network_id.as_str(), "1");
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = config_from(&[("PORT", "http"), ("GATE_SEED_DEMO", "yes"), ("DATABASE_URL", " ")]);

        assert_eq!(config.server.port, 8080);
        assert!(!config.registry.seed_demo);
        assert!(config.registry.database_url.is_none());
    }

    #[test]
    fn test_invalid_venue_is_rejected() {
        let config = config_from(&[("GATE_CONTRACT_ADDRESS", "0x-abc")]);
        assert!(config.venue().is_err());
    }
}
