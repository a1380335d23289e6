//! alloy binding of the deployed ATM contract.
//!
//! # Responsibilities
//! - Build a signer-bound HTTP provider for the connected account
//! - Read the balance with a request timeout
//! - Submit deposit (with value transfer) and withdraw calls
//! - Track submitted calls to finality by polling receipts

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::ledger::finality::{wait_for_finality, ChainView, FinalityPolicy, ReceiptSummary};
use crate::ledger::types::{
    Amount, Confirmation, LedgerConfig, LedgerError, LedgerResult, PendingTx,
};
use crate::ledger::{LedgerConnector, LedgerProxy};
use crate::wallet::WalletProvider;

sol! {
    /// Deployed ATM contract: whole-unit balance book with payable deposits.
    #[sol(rpc)]
    contract Atm {
        function getBalance() public view returns (uint256);
        function deposit(uint256 _amount) public payable;
        function withdraw(uint256 _withdrawAmount) public;
    }
}

/// Ledger proxy talking to the ATM contract over JSON-RPC.
pub struct AtmContract {
    instance: Atm::AtmInstance<DynProvider>,
    provider: DynProvider,
    account: Address,
    rpc_timeout: Duration,
    finality: FinalityPolicy,
}

impl AtmContract {
    /// Bind the contract at `contract_address` to a provider that signs as
    /// `account`. No network I/O happens here.
    pub fn new(
        provider: DynProvider,
        contract_address: Address,
        account: Address,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            instance: Atm::new(contract_address, provider.clone()),
            provider,
            account,
            rpc_timeout: Duration::from_secs(config.rpc_timeout_secs),
            finality: FinalityPolicy::from_config(config),
        }
    }

    /// Account that signs mutating calls.
    pub fn account(&self) -> Address {
        self.account
    }
}

#[async_trait]
impl ChainView for AtmContract {
    async fn receipt(&self, tx_hash: TxHash) -> LedgerResult<Option<ReceiptSummary>> {
        let fut = self.provider.get_transaction_receipt(tx_hash);
        match timeout(self.rpc_timeout, fut).await {
            Ok(Ok(receipt)) => Ok(receipt.map(|r| ReceiptSummary {
                succeeded: r.status(),
                block_number: r.block_number,
            })),
            Ok(Err(e)) => Err(LedgerError::Rpc(e.to_string())),
            Err(_) => Err(LedgerError::Timeout(self.rpc_timeout.as_secs())),
        }
    }

    async fn block_number(&self) -> LedgerResult<u64> {
        let fut = self.provider.get_block_number();
        match timeout(self.rpc_timeout, fut).await {
            Ok(Ok(block)) => Ok(block),
            Ok(Err(e)) => Err(LedgerError::Rpc(e.to_string())),
            Err(_) => Err(LedgerError::Timeout(self.rpc_timeout.as_secs())),
        }
    }
}

#[async_trait]
impl LedgerProxy for AtmContract {
    fn contract_address(&self) -> Address {
        *self.instance.address()
    }

    async fn get_balance(&self) -> LedgerResult<U256> {
        let call = self.instance.getBalance().from(self.account);
        match timeout(self.rpc_timeout, call.call()).await {
            Ok(Ok(balance)) => Ok(balance),
            Ok(Err(e)) => Err(LedgerError::Rpc(e.to_string())),
            Err(_) => Err(LedgerError::Timeout(self.rpc_timeout.as_secs())),
        }
    }

    async fn deposit(&self, amount: Amount) -> LedgerResult<PendingTx> {
        let value = amount.to_wei()?;
        let pending = self
            .instance
            .deposit(amount.units())
            .from(self.account)
            .value(value)
            .send()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, amount = %amount, value_wei = %value, "Deposit submitted");
        Ok(PendingTx { tx_hash })
    }

    async fn withdraw(&self, amount: Amount) -> LedgerResult<PendingTx> {
        let pending = self
            .instance
            .withdraw(amount.units())
            .from(self.account)
            .send()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, amount = %amount, "Withdrawal submitted");
        Ok(PendingTx { tx_hash })
    }

    async fn await_finality(&self, tx: &PendingTx) -> LedgerResult<Confirmation> {
        wait_for_finality(self, tx.tx_hash, &self.finality).await
    }
}

impl std::fmt::Debug for AtmContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtmContract")
            .field("contract", self.instance.address())
            .field("account", &self.account)
            .field("rpc_timeout", &self.rpc_timeout)
            .finish()
    }
}

/// Builds [`AtmContract`] proxies from the ledger configuration.
#[derive(Debug, Clone)]
pub struct ContractConnector {
    config: LedgerConfig,
    rpc_url: url::Url,
    contract_address: Address,
}

impl ContractConnector {
    /// Parse endpoint and contract address up front so connect cannot fail on
    /// them later.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let rpc_url: url::Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Config(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let contract_address: Address = config.contract_address.parse().map_err(|e| {
            LedgerError::Config(format!(
                "Invalid contract address '{}': {}",
                config.contract_address, e
            ))
        })?;

        Ok(Self {
            config,
            rpc_url,
            contract_address,
        })
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }
}

impl LedgerConnector for ContractConnector {
    fn connect(
        &self,
        wallet: &dyn WalletProvider,
        account: Address,
    ) -> LedgerResult<Arc<dyn LedgerProxy>> {
        let signer = wallet
            .signer(account)
            .map_err(|e| LedgerError::Signer(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(self.rpc_url.clone())
            .erased();

        tracing::info!(
            rpc_url = %self.rpc_url,
            chain_id = self.config.chain_id,
            contract = %self.contract_address,
            account = %account,
            "Ledger proxy bound"
        );

        Ok(Arc::new(AtmContract::new(
            provider,
            self.contract_address,
            account,
            &self.config,
        )))
    }
}
