//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate endpoint schemes (HTTP for queries, WebSocket for subscriptions)
//! - Validate value ranges (timeouts > 0, gas limit > 0)
//! - Request timeout must outlast a submission plus its confirmation wait
//! - Reject a missing signing key or contract address before any connection
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use std::fmt;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "chain.rpc_url", &config.chain.rpc_url, &["http", "https"]);
    for url in &config.chain.failover_urls {
        check_url(&mut errors, "chain.failover_urls", url, &["http", "https"]);
    }
    check_url(&mut errors, "chain.ws_url", &config.chain.ws_url, &["ws", "wss"]);

    if config.chain.private_key.is_empty() {
        errors.push(ValidationError::new(
            "chain.private_key",
            "signing key is required (set ETH_FETCHER_PRIVATE_KEY)",
        ));
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.chain.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.connect_timeout_secs", "must be greater than 0"));
    }

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "contract.address",
            format!("'{}' is not a valid address", config.contract.address),
        ));
    }
    if config.contract.gas_limit == 0 {
        errors.push(ValidationError::new("contract.gas_limit", "must be greater than 0"));
    }

    if config.confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must be greater than 0",
        ));
    }
    if config.ingest.reconnect_base_delay_ms > config.ingest.reconnect_max_delay_ms {
        errors.push(ValidationError::new(
            "ingest.reconnect_base_delay_ms",
            "must not exceed reconnect_max_delay_ms",
        ));
    }
    let submit_budget = config
        .confirmation
        .timeout_secs
        .saturating_add(config.chain.rpc_timeout_secs);
    if config.listener.request_timeout_secs <= submit_budget {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            format!(
                "must exceed confirmation.timeout_secs + chain.rpc_timeout_secs ({}s)",
                submit_budget
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, raw: &str, schemes: &[&str]) {
    match url::Url::parse(raw) {
        Ok(url) if schemes.contains(&url.scheme()) => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("scheme '{}' not allowed, expected one of {:?}", url.scheme(), schemes),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", raw, e))),
    }
}
