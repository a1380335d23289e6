//! Ledger subsystem: the deployed ATM contract as seen from the front-end.
//!
//! # Data Flow
//! ```text
//! Session controller
//!     → LedgerConnector::connect (signer-bound proxy, once per account)
//!     → LedgerProxy::get_balance (read-only call)
//!     → LedgerProxy::deposit / withdraw (signed, value transfer on deposit)
//!     → LedgerProxy::await_finality (finality.rs receipt polling)
//! ```
//!
//! # Constraints
//! - The contract owns balance correctness and authorization
//! - Amounts are whole units everywhere; wei exists only at the deposit value
//! - Read calls carry a timeout; finality waits only if configured to

pub mod contract;
pub mod finality;
pub mod types;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::wallet::WalletProvider;

pub use contract::{AtmContract, ContractConnector};
pub use finality::FinalityPolicy;
pub use types::{
    Amount, AmountParseError, Confirmation, LedgerConfig, LedgerError, LedgerResult, PendingTx,
};

/// Typed client handle bound to the deployed contract and a signer.
#[async_trait]
pub trait LedgerProxy: Send + Sync {
    /// Address of the contract this proxy talks to.
    fn contract_address(&self) -> Address;

    /// Current balance in whole units.
    async fn get_balance(&self) -> LedgerResult<U256>;

    /// Submit a deposit of `amount`, transferring the same value in wei.
    async fn deposit(&self, amount: Amount) -> LedgerResult<PendingTx>;

    /// Submit a withdrawal of `amount`.
    async fn withdraw(&self, amount: Amount) -> LedgerResult<PendingTx>;

    /// Suspend until `tx` is final or has failed.
    async fn await_finality(&self, tx: &PendingTx) -> LedgerResult<Confirmation>;
}

/// Constructs ledger proxies for a wallet account. Construction is local.
pub trait LedgerConnector: Send + Sync {
    fn connect(
        &self,
        wallet: &dyn WalletProvider,
        account: Address,
    ) -> LedgerResult<Arc<dyn LedgerProxy>>;
}
