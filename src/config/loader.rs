//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{AppConfig, SecretString};
use crate::config::validation::{validate_config, ValidationError};

/// Signing key override.
pub const PRIVATE_KEY_ENV_VAR: &str = "ETH_FETCHER_PRIVATE_KEY";
/// HTTP JSON-RPC endpoint override.
pub const NODE_URL_ENV_VAR: &str = "ETH_NODE_URL";
/// WebSocket endpoint override.
pub const SOCKET_URL_ENV_VAR: &str = "ETH_SOCKET_URL";
/// Contract address override.
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "ETH_FETCHER_CONTRACT_ADDRESS";
/// Listener bind address override.
pub const BIND_ADDRESS_ENV_VAR: &str = "ETH_FETCHER_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, override from the environment, and validate configuration.
///
/// A missing file yields the defaults, so a deployment can be configured
/// from environment variables alone.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
        parse_config(&content)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse TOML content without validating it.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Apply the supported environment overrides. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = lookup(PRIVATE_KEY_ENV_VAR) {
        config.chain.private_key = SecretString::new(key);
    }
    if let Some(url) = lookup(NODE_URL_ENV_VAR) {
        config.chain.rpc_url = url;
    }
    if let Some(url) = lookup(SOCKET_URL_ENV_VAR) {
        config.chain.ws_url = url;
    }
    if let Some(address) = lookup(CONTRACT_ADDRESS_ENV_VAR) {
        config.contract.address = address;
    }
    if let Some(addr) = lookup(BIND_ADDRESS_ENV_VAR) {
        config.listener.bind_address = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_take_precedence() {
        let mut config = parse_config(
            r#"
            [chain]
            rpc_url = "http://from-file:8545"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            (NODE_URL_ENV_VAR, "http://from-env:8545"),
            (PRIVATE_KEY_ENV_VAR, "0x01"),
            (SOCKET_URL_ENV_VAR, ""),
        ]
        .into_iter()
        .collect();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.chain.rpc_url, "http://from-env:8545");
        assert_eq!(config.chain.private_key.expose(), "0x01");
        // empty values do not clobber the file/default value
        assert_eq!(config.chain.ws_url, "ws://localhost:8546");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = parse_config("chain = 5").unwrap_err();
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_load_from_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fetcher.toml");
        std::fs::write(&path, "[contract]\naddress = \"not-an-address\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("contract.address"));
    }
}
