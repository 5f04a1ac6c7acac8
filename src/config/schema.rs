//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the fetcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration for the fetcher service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub listener: ListenerConfig,

    /// Node endpoints and signing key.
    pub chain: ChainConfig,

    /// Deployed person-info contract.
    pub contract: ContractConfig,

    /// Receipt polling for submitted transactions.
    pub confirmation: ConfirmationConfig,

    /// Background event ingestion.
    pub ingest: IngestConfig,

    /// Store journal locations.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds. Must cover a full confirmation wait
    /// for `POST /lime/savePerson`.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 330,
        }
    }
}

/// Private key wrapper that never prints or serializes its contents.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw secret. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

impl Serialize for SecretString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

/// Node connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL used for point queries and broadcasts.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// WebSocket endpoint URL used for event subscriptions.
    pub ws_url: String,

    /// Expected chain ID. 0 accepts whatever the node reports.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Connection establishment timeout in seconds (both endpoints).
    pub connect_timeout_secs: u64,

    /// Hex-encoded signing key. Normally supplied via `ETH_FETCHER_PRIVATE_KEY`.
    pub private_key: SecretString,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            ws_url: "ws://localhost:8546".to_string(),
            chain_id: 0,
            rpc_timeout_secs: 10,
            connect_timeout_secs: 10,
            private_key: SecretString::default(),
        }
    }
}

/// Contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of the SimplePersonInfoContract.
    pub address: String,

    /// Gas limit used for `setPersonInfo`.
    pub gas_limit: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            gas_limit: 300_000,
        }
    }
}

/// Receipt polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Delay between receipt polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum time to wait for a receipt in seconds.
    pub timeout_secs: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            timeout_secs: 300,
        }
    }
}

/// Event ingestion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Run the background ingestor.
    pub enabled: bool,

    /// Consecutive subscription failures tolerated before the ingestor
    /// stops. 0 stops on the first failure.
    pub max_reconnect_attempts: u32,

    /// Base delay for reconnect backoff in milliseconds.
    pub reconnect_base_delay_ms: u64,

    /// Maximum delay for reconnect backoff in milliseconds.
    pub reconnect_max_delay_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_reconnect_attempts: 5,
            reconnect_base_delay_ms: 500,
            reconnect_max_delay_ms: 30_000,
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Journal file for transaction records. `None` keeps records in memory only.
    pub transactions_path: Option<String>,

    /// Journal file for ingested events. `None` keeps events in memory only.
    pub events_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            transactions_path: Some("data/transactions.jsonl".to_string()),
            events_path: Some("data/person_info_events.jsonl".to_string()),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.confirmation.poll_interval_ms, 1_000);
        assert_eq!(config.confirmation.timeout_secs, 300);
        assert_eq!(config.contract.gas_limit, 300_000);
        assert!(config.ingest.enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [chain]
            rpc_url = "http://node:8545"
            private_key = "abc"

            [ingest]
            max_reconnect_attempts = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.chain.rpc_url, "http://node:8545");
        assert_eq!(config.chain.ws_url, "ws://localhost:8546");
        assert_eq!(config.chain.private_key.expose(), "abc");
        assert_eq!(config.ingest.max_reconnect_attempts, 0);
        assert_eq!(config.ingest.reconnect_base_delay_ms, 500);
    }

    #[test]
    fn test_secret_is_redacted() {
        let secret = SecretString::new("deadbeef");
        assert_eq!(format!("{:?}", secret), "SecretString(***)");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"***\"");
    }

    #[test]
    fn test_log_format_parsing() {
        let config: ObservabilityConfig = toml::from_str(r#"log_format = "json""#).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
