//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the console.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the ATM console.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AtmConfig {
    /// Wallet discovery settings.
    pub wallet: WalletConfig,

    /// Deployed contract and RPC settings.
    pub ledger: LedgerConfig,

    /// Presentation settings.
    pub console: ConsoleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Wallet discovery configuration.
///
/// The private key itself is never part of the config file; only the name of
/// the environment variable that carries it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the hex-encoded signing key.
    pub private_key_env: String,

    /// Treat the wallet as having already authorized this front-end, so
    /// `get_accounts` reports the address before any connect request.
    pub pre_authorized: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: "ATM_WALLET_PRIVATE_KEY".to_string(),
            pre_authorized: false,
        }
    }
}

/// Deployed ATM contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil/Hardhat).
    pub chain_id: u64,

    /// Address of the deployed ATM contract.
    pub contract_address: String,

    /// Read-only RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Block depth (inclusion counts as one) required for finality.
    pub confirmation_blocks: u32,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Upper bound on the finality wait. Unset waits indefinitely.
    pub confirmation_timeout_secs: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            contract_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            poll_interval_ms: 1000,
            confirmation_timeout_secs: None,
        }
    }
}

/// Console presentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Banner shown above every screen.
    pub title: String,

    /// Optional display name shown next to the connected account.
    pub account_holder: Option<String>,

    /// Unit label appended to balances.
    pub currency_symbol: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            title: "Welcome to the ATM!".to_string(),
            account_holder: None,
            currency_symbol: "ETH".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
