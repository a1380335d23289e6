//! Shared test doubles for the session and console tests.

#![allow(dead_code)]

use alloy::network::EthereumWallet;
use alloy::primitives::{address, Address, TxHash, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use atm_console::ledger::{
    Amount, Confirmation, LedgerConnector, LedgerError, LedgerProxy, LedgerResult, PendingTx,
};
use atm_console::session::SessionController;
use atm_console::wallet::{WalletDetector, WalletError, WalletProvider, WalletResult};

/// Wallet that grants a fixed list of accounts (empty = user denies).
pub struct FakeWallet {
    granted: Mutex<Vec<Address>>,
    rejects: bool,
    authorized: AtomicBool,
    pub requests: AtomicUsize,
}

impl FakeWallet {
    fn new(granted: Vec<Address>, rejects: bool) -> Self {
        Self {
            granted: Mutex::new(granted),
            rejects,
            authorized: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn granting(account: Address) -> Self {
        Self::new(vec![account], false)
    }

    pub fn denying() -> Self {
        Self::new(Vec::new(), false)
    }

    /// Answers the account request with an error, as most wallets do when
    /// the user clicks "reject".
    pub fn rejecting() -> Self {
        Self::new(vec![account_abc()], true)
    }

    pub fn already_authorized(account: Address) -> Self {
        let wallet = Self::granting(account);
        wallet.authorized.store(true, Ordering::SeqCst);
        wallet
    }

    /// The user picked another account in the wallet.
    pub fn switch_to(&self, account: Address) {
        *self.granted.lock().unwrap() = vec![account];
    }

    fn granted(&self) -> Vec<Address> {
        self.granted.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    fn name(&self) -> &str {
        "fake"
    }

    async fn request_accounts(&self) -> WalletResult<Vec<Address>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.rejects {
            return Err(WalletError::Rejected);
        }
        let granted = self.granted();
        if !granted.is_empty() {
            self.authorized.store(true, Ordering::SeqCst);
        }
        Ok(granted)
    }

    async fn get_accounts(&self) -> WalletResult<Vec<Address>> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(self.granted())
        } else {
            Ok(Vec::new())
        }
    }

    fn signer(&self, account: Address) -> WalletResult<EthereumWallet> {
        if !self.granted().contains(&account) {
            return Err(WalletError::UnknownAccount(account));
        }
        Ok(EthereumWallet::from(PrivateKeySigner::random()))
    }
}

/// Detector that always answers with the same wallet (or none).
pub struct FixedDetector(pub Option<Arc<dyn WalletProvider>>);

impl WalletDetector for FixedDetector {
    fn detect(&self) -> Option<Arc<dyn WalletProvider>> {
        self.0.clone()
    }
}

/// In-memory ATM contract.
///
/// Withdrawals above the balance are rejected at submission, like a call
/// that fails gas estimation on revert.
pub struct FakeLedger {
    balance: Mutex<U256>,
    nonce: AtomicU64,
    pending: Mutex<Vec<(TxHash, bool, U256)>>,
    pub reject_submissions: AtomicBool,
    pub revert_on_finality: AtomicBool,
    pub fail_balance_reads: AtomicBool,
    pub balance_reads: AtomicUsize,
    /// When set, finality waits for a `notify_one` on this.
    pub gate: Option<Arc<Notify>>,
    /// Signalled whenever a call is submitted.
    pub submitted: Arc<Notify>,
}

impl FakeLedger {
    pub fn with_balance(units: u64) -> Self {
        Self {
            balance: Mutex::new(U256::from(units)),
            nonce: AtomicU64::new(0),
            pending: Mutex::new(Vec::new()),
            reject_submissions: AtomicBool::new(false),
            revert_on_finality: AtomicBool::new(false),
            fail_balance_reads: AtomicBool::new(false),
            balance_reads: AtomicUsize::new(0),
            gate: None,
            submitted: Arc::new(Notify::new()),
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn balance(&self) -> U256 {
        *self.balance.lock().unwrap()
    }

    fn submit(&self, is_deposit: bool, amount: Amount) -> LedgerResult<PendingTx> {
        if self.reject_submissions.load(Ordering::SeqCst) {
            return Err(LedgerError::Rpc("user rejected the request".to_string()));
        }
        if !is_deposit && amount.units() > self.balance() {
            return Err(LedgerError::Rpc(
                "execution reverted: Insufficient balance".to_string(),
            ));
        }
        let n = self.nonce.fetch_add(1, Ordering::SeqCst) + 1;
        let tx_hash = TxHash::from(U256::from(n));
        self.pending
            .lock()
            .unwrap()
            .push((tx_hash, is_deposit, amount.units()));
        self.submitted.notify_one();
        Ok(PendingTx { tx_hash })
    }
}

#[async_trait]
impl LedgerProxy for FakeLedger {
    fn contract_address(&self) -> Address {
        Address::repeat_byte(0x5f)
    }

    async fn get_balance(&self) -> LedgerResult<U256> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_balance_reads.load(Ordering::SeqCst) {
            return Err(LedgerError::Timeout(10));
        }
        Ok(self.balance())
    }

    async fn deposit(&self, amount: Amount) -> LedgerResult<PendingTx> {
        self.submit(true, amount)
    }

    async fn withdraw(&self, amount: Amount) -> LedgerResult<PendingTx> {
        self.submit(false, amount)
    }

    async fn await_finality(&self, tx: &PendingTx) -> LedgerResult<Confirmation> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let entry = {
            let mut pending = self.pending.lock().unwrap();
            let index = pending.iter().position(|(hash, _, _)| *hash == tx.tx_hash);
            index.map(|i| pending.remove(i))
        };
        let Some((_, is_deposit, units)) = entry else {
            return Err(LedgerError::Rpc("unknown transaction".to_string()));
        };

        if self.revert_on_finality.load(Ordering::SeqCst) {
            return Err(LedgerError::Reverted(format!("transaction {} reverted", tx.tx_hash)));
        }

        let mut balance = self.balance.lock().unwrap();
        *balance = if is_deposit {
            *balance + units
        } else {
            balance.saturating_sub(units)
        };
        Ok(Confirmation {
            tx_hash: tx.tx_hash,
            block_number: self.nonce.load(Ordering::SeqCst),
        })
    }
}

/// Hands out the same in-memory ledger for every account.
pub struct FakeConnector {
    pub ledger: Arc<FakeLedger>,
    pub connects: AtomicUsize,
}

impl FakeConnector {
    pub fn new(ledger: Arc<FakeLedger>) -> Self {
        Self {
            ledger,
            connects: AtomicUsize::new(0),
        }
    }
}

impl LedgerConnector for FakeConnector {
    fn connect(
        &self,
        wallet: &dyn WalletProvider,
        account: Address,
    ) -> LedgerResult<Arc<dyn LedgerProxy>> {
        wallet
            .signer(account)
            .map_err(|e| LedgerError::Signer(e.to_string()))?;
        self.connects.fetch_add(1, Ordering::SeqCst);
        let ledger: Arc<dyn LedgerProxy> = self.ledger.clone();
        Ok(ledger)
    }
}

/// Everything a test needs to drive and inspect a controller.
pub struct Harness {
    pub controller: Arc<SessionController>,
    pub ledger: Arc<FakeLedger>,
    pub connector: Arc<FakeConnector>,
}

pub fn harness(wallet: Option<Arc<dyn WalletProvider>>, ledger: FakeLedger) -> Harness {
    let ledger = Arc::new(ledger);
    let connector = Arc::new(FakeConnector::new(ledger.clone()));
    let controller = Arc::new(SessionController::new(
        Arc::new(FixedDetector(wallet)),
        connector.clone(),
    ));
    Harness {
        controller,
        ledger,
        connector,
    }
}

/// The account `0xABC` used throughout the scenarios.
pub fn account_abc() -> Address {
    address!("0000000000000000000000000000000000000abc")
}

/// A second account for account-switch scenarios.
pub fn account_def() -> Address {
    address!("0000000000000000000000000000000000000def")
}
