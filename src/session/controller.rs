//! Session controller: wallet connection and transaction lifecycle.
//!
//! # State machine
//! ```text
//! Uninitialized ──detect──▶ WalletDetected ──connect (accounts granted)──▶ Connected
//!                                 ▲   │
//!                                 └───┘ connect (no account): unchanged
//!
//! Connected ──ledger acquired (once)──▶ Ready ──balance fetched──▶ BalanceLoaded
//! BalanceLoaded ──deposit / withdraw──▶ BalanceLoaded (balance refreshed, log appended)
//! ```
//!
//! # Concurrency
//! - Operations take `&self`; the controller is shared via `Arc`
//! - The session snapshot is swapped atomically, readers never block
//! - Log and status locks are never held across an `.await`
//! - One deposit/withdraw at a time: a second submission while one is in
//!   flight is rejected with [`SubmitOutcome::Busy`]

use alloy::primitives::{Address, TxHash, U256};
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ledger::{Amount, Confirmation, LedgerConnector, LedgerError, LedgerProxy};
use crate::observability::metrics;
use crate::session::error::SessionError;
use crate::session::history::TransactionLog;
use crate::session::types::{
    LastStatus, Operation, Outcome, PendingAmount, Session, SessionPhase, SubmitOutcome,
    TransactionRecord,
};
use crate::wallet::{WalletDetector, WalletError};

/// Owner of the session, the transaction log and the last status line.
pub struct SessionController {
    detector: Arc<dyn WalletDetector>,
    connector: Arc<dyn LedgerConnector>,
    session: ArcSwap<Session>,
    history: Mutex<TransactionLog>,
    status: Mutex<Option<LastStatus>>,
    in_flight: AtomicBool,
}

impl SessionController {
    /// Create a controller in the `Uninitialized` phase.
    pub fn new(detector: Arc<dyn WalletDetector>, connector: Arc<dyn LedgerConnector>) -> Self {
        Self {
            detector,
            connector,
            session: ArcSwap::from_pointee(Session::default()),
            history: Mutex::new(TransactionLog::new()),
            status: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Arc<Session> {
        self.session.load_full()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.load().phase()
    }

    /// Transaction log, newest first.
    pub fn history(&self) -> Vec<TransactionRecord> {
        lock(&self.history).to_vec()
    }

    pub fn last_status(&self) -> Option<LastStatus> {
        lock(&self.status).clone()
    }

    /// Whether a deposit or withdrawal is awaiting its remote call.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Look for a wallet and remember it.
    ///
    /// When a wallet is already held, picks up accounts it has already
    /// authorized instead (no prompt). Absence of a wallet is not an error.
    pub async fn detect_wallet(&self) -> SessionPhase {
        let held = self.session.load().wallet.clone();

        match held {
            None => match self.detector.detect() {
                Some(wallet) => {
                    tracing::info!(wallet = wallet.name(), "Wallet detected");
                    self.session.rcu(|current| {
                        let mut next = Session::clone(current);
                        next.wallet.get_or_insert_with(|| wallet.clone());
                        next
                    });
                }
                None => tracing::info!("No wallet detected"),
            },
            Some(wallet) => match wallet.get_accounts().await {
                Ok(accounts) => {
                    if let Err(e) = self.handle_accounts(accounts) {
                        tracing::debug!(error = %e, "No usable authorized account");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to read authorized accounts"),
            },
        }

        self.phase()
    }

    /// Ask the wallet for account access and bind the ledger to the first
    /// account granted. A refusal, empty or rejected, is `NoAuthorizedAccount`.
    pub async fn connect(&self) -> Result<Address, SessionError> {
        let Some(wallet) = self.session.load().wallet.clone() else {
            tracing::warn!("A wallet is required to connect");
            return Err(SessionError::WalletUnavailable);
        };

        let accounts = match wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(WalletError::Rejected) => {
                tracing::info!(wallet = wallet.name(), "No account found, request rejected");
                return Err(SessionError::NoAuthorizedAccount);
            }
            Err(e) => {
                tracing::warn!(wallet = wallet.name(), error = %e, "Account request failed");
                return Err(e.into());
            }
        };

        self.handle_accounts(accounts)
    }

    /// Overwrite the balance with a fresh read. No-op without a ledger.
    ///
    /// On failure the last known balance is kept.
    pub async fn fetch_balance(&self) -> Result<Option<U256>, SessionError> {
        let Some(ledger) = self.session.load().ledger.clone() else {
            return Ok(None);
        };

        match ledger.get_balance().await {
            Ok(balance) => {
                self.session.rcu(|current| {
                    let mut next = Session::clone(current);
                    // Ignore reads from a proxy replaced meanwhile.
                    if next.ledger.as_ref().is_some_and(|l| Arc::ptr_eq(l, &ledger)) {
                        next.balance = Some(balance);
                    }
                    next
                });
                metrics::record_balance_fetch(true);
                tracing::debug!(balance = %balance, "Balance refreshed");
                Ok(Some(balance))
            }
            Err(e) => {
                metrics::record_balance_fetch(false);
                tracing::warn!(error = %e, "Balance fetch failed, keeping last known balance");
                Err(e.into())
            }
        }
    }

    /// Run the automatic transitions: acquire the ledger when `Connected`,
    /// load the balance when `Ready`.
    pub async fn advance(&self) -> SessionPhase {
        if self.phase() == SessionPhase::Connected {
            if let Err(e) = self.acquire_ledger() {
                tracing::warn!(error = %e, "Ledger proxy unavailable");
            }
        }
        if self.phase() == SessionPhase::Ready {
            // Failure is logged by fetch_balance and retried on the next pass.
            let _ = self.fetch_balance().await;
        }
        self.phase()
    }

    pub async fn submit_deposit(&self, amount: impl Into<PendingAmount>) -> SubmitOutcome {
        self.submit(Operation::Deposit, amount.into()).await
    }

    pub async fn submit_withdraw(&self, amount: impl Into<PendingAmount>) -> SubmitOutcome {
        self.submit(Operation::Withdrawal, amount.into()).await
    }

    /// Empty the transaction log.
    pub fn clear_history(&self) {
        let mut history = lock(&self.history);
        let cleared = history.len();
        history.clear();
        tracing::info!(cleared, "Transaction history cleared");
    }

    fn handle_accounts(&self, accounts: Vec<Address>) -> Result<Address, SessionError> {
        let Some(&account) = accounts.first() else {
            tracing::info!("No account found");
            return Err(SessionError::NoAuthorizedAccount);
        };

        tracing::info!(account = %account, "Account connected");
        self.session.rcu(|current| {
            let mut next = Session::clone(current);
            if next.account != Some(account) {
                next.account = Some(account);
                next.ledger = None;
                next.balance = None;
            }
            next
        });

        self.acquire_ledger()?;
        Ok(account)
    }

    /// Bind a ledger proxy to the current account unless one is held.
    fn acquire_ledger(&self) -> Result<(), SessionError> {
        let current = self.session.load_full();
        let (Some(wallet), Some(account)) = (current.wallet.clone(), current.account) else {
            return Ok(());
        };
        if current.ledger.is_some() {
            return Ok(());
        }

        let ledger = self.connector.connect(wallet.as_ref(), account)?;
        self.session.rcu(|current| {
            let mut next = Session::clone(current);
            if next.account == Some(account) && next.ledger.is_none() {
                next.ledger = Some(ledger.clone());
            }
            next
        });
        Ok(())
    }

    async fn submit(&self, operation: Operation, input: PendingAmount) -> SubmitOutcome {
        let Some(ledger) = self.session.load().ledger.clone() else {
            tracing::debug!(operation = %operation, "No ledger proxy, ignoring submission");
            return SubmitOutcome::Skipped;
        };
        let Some(amount) = input.validated() else {
            tracing::debug!(operation = %operation, input = %input, "Amount is not a positive whole number, ignoring submission");
            return SubmitOutcome::Skipped;
        };
        let Some(_flight) = InFlight::enter(&self.in_flight) else {
            tracing::warn!(operation = %operation, amount = %amount, "Another transaction is in flight, rejecting submission");
            return SubmitOutcome::Busy;
        };

        let (outcome, tx_hash) = match execute(ledger.as_ref(), operation, amount).await {
            Ok(confirmation) => {
                tracing::info!(
                    operation = %operation,
                    amount = %amount,
                    tx_hash = %confirmation.tx_hash,
                    block_number = confirmation.block_number,
                    "Transaction confirmed"
                );
                if let Err(e) = self.fetch_balance().await {
                    tracing::warn!(error = %e, "Transaction confirmed but balance refresh failed");
                }
                (Outcome::Success, Some(confirmation.tx_hash))
            }
            Err((e, tx_hash)) => {
                tracing::error!(operation = %operation, amount = %amount, error = %e, "Transaction failed");
                (Outcome::Failed, tx_hash)
            }
        };

        let record = TransactionRecord::new(operation, amount, outcome, tx_hash);
        *lock(&self.status) = Some(LastStatus {
            message: operation.status_message(outcome),
            timestamp: record.timestamp,
        });
        lock(&self.history).push(record.clone());
        metrics::record_transaction(operation.as_str(), outcome.as_str());

        SubmitOutcome::Completed(record)
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &*self.session.load())
            .field("history_len", &lock(&self.history).len())
            .field("busy", &self.is_busy())
            .finish()
    }
}

/// Submit the call and wait for finality. The hash is kept on failure when
/// the call got as far as submission.
async fn execute(
    ledger: &dyn LedgerProxy,
    operation: Operation,
    amount: Amount,
) -> Result<Confirmation, (LedgerError, Option<TxHash>)> {
    let pending = match operation {
        Operation::Deposit => ledger.deposit(amount).await,
        Operation::Withdrawal => ledger.withdraw(amount).await,
    }
    .map_err(|e| (e, None))?;

    ledger
        .await_finality(&pending)
        .await
        .map_err(|e| (e, Some(pending.tx_hash)))
}

/// Marks a submission in flight until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
