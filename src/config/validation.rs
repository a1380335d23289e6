//! Configuration validation.
//!
//! Serde handles syntax; this module checks values: URLs parse, the contract
//! address is a valid 20-byte address, durations are non-zero. Every problem
//! is collected so a single run reports all of them.

use std::net::SocketAddr;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::AtmConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("wallet.private_key_env must not be empty")]
    EmptyKeyVariable,

    #[error("ledger.rpc_url '{0}' is not a valid http(s) URL")]
    InvalidRpcUrl(String),

    #[error("ledger.contract_address '{0}' is not a valid address")]
    InvalidContractAddress(String),

    #[error("ledger.contract_address must not be the zero address")]
    ZeroContractAddress,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, returning every error found.
pub fn validate_config(config: &AtmConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.wallet.private_key_env.trim().is_empty() {
        errors.push(ValidationError::EmptyKeyVariable);
    }

    let ledger = &config.ledger;
    match url::Url::parse(&ledger.rpc_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidRpcUrl(ledger.rpc_url.clone())),
    }

    match ledger.contract_address.parse::<Address>() {
        Ok(address) if address.is_zero() => errors.push(ValidationError::ZeroContractAddress),
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidContractAddress(
            ledger.contract_address.clone(),
        )),
    }

    let positive = [
        ("ledger.chain_id", ledger.chain_id),
        ("ledger.rpc_timeout_secs", ledger.rpc_timeout_secs),
        ("ledger.confirmation_blocks", u64::from(ledger.confirmation_blocks)),
        ("ledger.poll_interval_ms", ledger.poll_interval_ms),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }
    if ledger.confirmation_timeout_secs == Some(0) {
        errors.push(ValidationError::Zero {
            field: "ledger.confirmation_timeout_secs",
        });
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            observability.log_level.clone(),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
