//! Session state, transaction records and status types.

use alloy::primitives::{Address, TxHash, U256};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::ledger::{Amount, LedgerProxy};
use crate::wallet::WalletProvider;

/// Kind of mutating ledger call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Deposit,
    Withdrawal,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Deposit => "Deposit",
            Operation::Withdrawal => "Withdrawal",
        }
    }

    /// Status line for a finished attempt.
    pub fn status_message(&self, outcome: Outcome) -> String {
        format!("{} {}", self.as_str(), outcome.as_str())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failed => "failed",
        }
    }
}

/// One completed deposit or withdrawal attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub operation: Operation,
    pub amount: Amount,
    pub outcome: Outcome,
    pub timestamp: DateTime<Local>,
    /// Hash of the submitted call, absent when submission itself failed.
    pub tx_hash: Option<TxHash>,
}

impl TransactionRecord {
    pub fn new(
        operation: Operation,
        amount: Amount,
        outcome: Outcome,
        tx_hash: Option<TxHash>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            amount,
            outcome,
            timestamp: Local::now(),
            tx_hash,
        }
    }
}

/// Most recent status line, overwritten on every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastStatus {
    pub message: String,
    pub timestamp: DateTime<Local>,
}

/// Raw amount input as typed by the user.
///
/// Nothing is checked until submission; [`PendingAmount::validated`] is the
/// only way to an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAmount(String);

impl PendingAmount {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// The amount, if it parses and is strictly positive.
    pub fn validated(&self) -> Option<Amount> {
        self.0.parse::<Amount>().ok().filter(|amount| !amount.is_zero())
    }
}

impl Default for PendingAmount {
    fn default() -> Self {
        Self("0".to_string())
    }
}

impl From<&str> for PendingAmount {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PendingAmount {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<u64> for PendingAmount {
    fn from(units: u64) -> Self {
        Self(units.to_string())
    }
}

impl fmt::Display for PendingAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse lifecycle state, derived from which session fields are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    Uninitialized,
    WalletDetected,
    Connected,
    Ready,
    BalanceLoaded,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Uninitialized => "uninitialized",
            SessionPhase::WalletDetected => "wallet-detected",
            SessionPhase::Connected => "connected",
            SessionPhase::Ready => "ready",
            SessionPhase::BalanceLoaded => "balance-loaded",
        };
        f.write_str(name)
    }
}

/// Snapshot of the connection state.
///
/// `ledger` is only set while `account` is set; `balance` only means
/// something while `ledger` is set.
#[derive(Clone, Default)]
pub struct Session {
    pub wallet: Option<Arc<dyn WalletProvider>>,
    pub account: Option<Address>,
    pub ledger: Option<Arc<dyn LedgerProxy>>,
    pub balance: Option<U256>,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        if self.wallet.is_none() {
            SessionPhase::Uninitialized
        } else if self.account.is_none() {
            SessionPhase::WalletDetected
        } else if self.ledger.is_none() {
            SessionPhase::Connected
        } else if self.balance.is_none() {
            SessionPhase::Ready
        } else {
            SessionPhase::BalanceLoaded
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("wallet", &self.wallet.as_ref().map(|w| w.name().to_string()))
            .field("account", &self.account)
            .field(
                "ledger",
                &self.ledger.as_ref().map(|l| l.contract_address()),
            )
            .field("balance", &self.balance)
            .finish()
    }
}

/// Result of a deposit or withdrawal submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Guard not met (no ledger, or amount not a positive number). Nothing changed.
    Skipped,
    /// Another submission is still in flight. Nothing changed.
    Busy,
    /// The attempt finished and was recorded.
    Completed(TransactionRecord),
}
