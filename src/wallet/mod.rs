//! Wallet subsystem: account authorization and signing capability.
//!
//! # Data Flow
//! ```text
//! Environment variable (private key)
//!     → WalletDetector::detect (is a wallet available at all?)
//!     → WalletProvider::request_accounts / get_accounts
//!     → WalletProvider::signer (handed to the ledger connector)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data

pub mod local;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use local::{EnvWalletDetector, LocalWallet};

/// Errors reported by a wallet provider.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No wallet is available.
    #[error("Wallet not installed: {0} is not set")]
    NotInstalled(String),

    /// Key material could not be parsed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The user declined the request.
    #[error("Request rejected by user")]
    Rejected,

    /// The account is not managed by this wallet.
    #[error("Account {0} is not managed by this wallet")]
    UnknownAccount(Address),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// Capability provider that manages key custody, account authorization and
/// transaction signing.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Ask for account access. May suspend until the user answers; an empty
    /// list means the user denied access.
    async fn request_accounts(&self) -> WalletResult<Vec<Address>>;

    /// Accounts already authorized, without prompting.
    async fn get_accounts(&self) -> WalletResult<Vec<Address>>;

    /// Signing capability for `account`.
    fn signer(&self, account: Address) -> WalletResult<EthereumWallet>;
}

/// Finds an available wallet, if any.
pub trait WalletDetector: Send + Sync {
    fn detect(&self) -> Option<Arc<dyn WalletProvider>>;
}
