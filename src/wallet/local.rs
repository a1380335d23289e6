//! Key-backed wallet provider.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - Only the wallet's own address can be used as signer

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::WalletConfig;
use crate::wallet::{WalletDetector, WalletError, WalletProvider, WalletResult};

/// Wallet holding a single local signing key.
///
/// Behaves like an injected browser wallet with one account: nothing is
/// reported by `get_accounts` until the front-end asked for access once.
#[derive(Debug)]
pub struct LocalWallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Set once the account was granted to this front-end.
    authorized: AtomicBool,
}

impl LocalWallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for EIP-155 replay protection
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> WalletResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::InvalidKey(format!("Invalid private key format: {}", e)))?;
        let signer = signer.with_chain_id(Some(chain_id));

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Ok(Self {
            signer,
            authorized: AtomicBool::new(false),
        })
    }

    /// Load wallet from the named environment variable.
    pub fn from_env(var: &str, chain_id: u64) -> WalletResult<Self> {
        let private_key = std::env::var(var).map_err(|_| WalletError::NotInstalled(var.to_string()))?;

        Self::from_private_key(&private_key, chain_id)
    }

    /// Mark the account as already granted to this front-end.
    pub fn pre_authorized(self) -> Self {
        self.authorized.store(true, Ordering::SeqCst);
        self
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Chain ID used when signing.
    pub fn chain_id(&self) -> Option<u64> {
        self.signer.chain_id()
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    fn name(&self) -> &str {
        "local-key"
    }

    async fn request_accounts(&self) -> WalletResult<Vec<Address>> {
        if !self.authorized.swap(true, Ordering::SeqCst) {
            tracing::info!(address = %self.address(), "Account access granted");
        }
        Ok(vec![self.address()])
    }

    async fn get_accounts(&self) -> WalletResult<Vec<Address>> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(vec![self.address()])
        } else {
            Ok(Vec::new())
        }
    }

    fn signer(&self, account: Address) -> WalletResult<EthereumWallet> {
        if account != self.address() {
            return Err(WalletError::UnknownAccount(account));
        }
        Ok(EthereumWallet::from(self.signer.clone()))
    }
}

/// Detects a [`LocalWallet`] through an environment variable.
#[derive(Debug, Clone)]
pub struct EnvWalletDetector {
    env_var: String,
    chain_id: u64,
    pre_authorized: bool,
}

impl EnvWalletDetector {
    pub fn new(config: &WalletConfig, chain_id: u64) -> Self {
        Self {
            env_var: config.private_key_env.clone(),
            chain_id,
            pre_authorized: config.pre_authorized,
        }
    }
}

impl WalletDetector for EnvWalletDetector {
    fn detect(&self) -> Option<Arc<dyn WalletProvider>> {
        match LocalWallet::from_env(&self.env_var, self.chain_id) {
            Ok(wallet) if self.pre_authorized => Some(Arc::new(wallet.pre_authorized())),
            Ok(wallet) => Some(Arc::new(wallet)),
            Err(WalletError::NotInstalled(var)) => {
                tracing::debug!(env_var = %var, "No wallet key in environment");
                None
            }
            Err(e) => {
                tracing::warn!(env_var = %self.env_var, error = %e, "Ignoring unusable wallet key");
                None
            }
        }
    }
}
