//! Ledger amounts, transaction handles and error definitions.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{TxHash, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export LedgerConfig from config module to avoid duplication
pub use crate::config::schema::LedgerConfig;

/// Wei per whole contract unit (10^18).
const WEI_PER_UNIT: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// A count of whole contract units, the one amount representation used from
/// the input line through the log.
///
/// The contract books whole units; only the value attached to a deposit is
/// expressed in wei, see [`Amount::to_wei`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct Amount(U256);

impl Amount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn new(units: U256) -> Self {
        Self(units)
    }

    pub fn units(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Convert to the chain's smallest unit for the value transfer.
    pub fn to_wei(&self) -> LedgerResult<U256> {
        self.0
            .checked_mul(WEI_PER_UNIT)
            .ok_or(LedgerError::AmountOverflow(*self))
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(U256::from(units))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Why an amount input could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a whole number of units")]
    Invalid(String),
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::Invalid(trimmed.to_string()));
        }
        U256::from_str_radix(trimmed, 10)
            .map(Self)
            .map_err(|_| AmountParseError::Invalid(trimmed.to_string()))
    }
}

/// A submitted mutating call that has not reached finality yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTx {
    pub tx_hash: TxHash,
}

/// Proof that a submitted call reached finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// Transaction confirmation status while polling for finality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction is pending in mempool.
    Pending,
    /// Transaction has been mined but not enough confirmations.
    Confirming { current: u32, required: u32 },
    /// Transaction is confirmed with required block depth.
    Confirmed { block_number: u64 },
    /// Transaction was mined but reverted.
    Failed(String),
}

/// Errors that can occur talking to the deployed contract.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// RPC connection or request failed (includes rejected or reverted calls).
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction did not reach finality within the configured bound.
    #[error("Transaction not final after {0} seconds")]
    ConfirmationTimeout(u64),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// The wallet could not supply a signer for the account.
    #[error("Signer unavailable: {0}")]
    Signer(String),

    /// Endpoint or contract address could not be used.
    #[error("Invalid ledger configuration: {0}")]
    Config(String),

    /// Amount does not fit in wei.
    #[error("Amount {0} overflows when converted to wei")]
    AmountOverflow(Amount),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
