//! Wallet connection and transaction lifecycle scenarios.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use alloy::primitives::U256;
use chrono::Local;
use tokio::sync::Notify;

use atm_console::ledger::Amount;
use atm_console::session::{Operation, Outcome, SessionError, SessionPhase, SubmitOutcome};
use atm_console::wallet::WalletProvider;

mod common;

use common::{account_abc, account_def, harness, FakeLedger, FakeWallet};

fn wallet(wallet: FakeWallet) -> Option<Arc<dyn WalletProvider>> {
    Some(Arc::new(wallet))
}

/// Detect, connect and load the balance.
async fn connected(ledger: FakeLedger) -> common::Harness {
    let h = harness(wallet(FakeWallet::granting(account_abc())), ledger);
    assert_eq!(h.controller.detect_wallet().await, SessionPhase::WalletDetected);
    h.controller.connect().await.expect("connect");
    assert_eq!(h.controller.advance().await, SessionPhase::BalanceLoaded);
    h
}

#[tokio::test]
async fn test_wallet_absent_no_transitions() {
    let h = harness(None, FakeLedger::with_balance(5));

    assert_eq!(h.controller.detect_wallet().await, SessionPhase::Uninitialized);
    assert!(matches!(
        h.controller.connect().await,
        Err(SessionError::WalletUnavailable)
    ));
    assert_eq!(h.controller.advance().await, SessionPhase::Uninitialized);
    assert_eq!(h.connector.connects.load(Ordering::SeqCst), 0);
    assert_eq!(h.ledger.balance_reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_denied_account_request_changes_nothing() {
    let h = harness(wallet(FakeWallet::denying()), FakeLedger::with_balance(5));
    h.controller.detect_wallet().await;

    let result = h.controller.connect().await;
    assert!(matches!(result, Err(SessionError::NoAuthorizedAccount)));

    let session = h.controller.session();
    assert!(session.account.is_none());
    assert!(session.ledger.is_none());
    assert_eq!(h.controller.phase(), SessionPhase::WalletDetected);
    assert!(h.controller.history().is_empty());
    assert!(h.controller.last_status().is_none());
    assert_eq!(h.connector.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_account_request_reports_no_account() {
    let h = harness(wallet(FakeWallet::rejecting()), FakeLedger::with_balance(5));
    h.controller.detect_wallet().await;

    let result = h.controller.connect().await;
    assert!(matches!(result, Err(SessionError::NoAuthorizedAccount)));

    let session = h.controller.session();
    assert!(session.account.is_none());
    assert!(session.ledger.is_none());
    assert_eq!(h.controller.phase(), SessionPhase::WalletDetected);
    assert!(h.controller.history().is_empty());
    assert!(h.controller.last_status().is_none());
    assert_eq!(h.connector.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_connect_and_load_balance() {
    let h = harness(
        wallet(FakeWallet::granting(account_abc())),
        FakeLedger::with_balance(5),
    );
    h.controller.detect_wallet().await;

    let account = h.controller.connect().await.unwrap();
    assert_eq!(account, account_abc());
    assert_eq!(h.controller.phase(), SessionPhase::Ready);

    assert_eq!(h.controller.advance().await, SessionPhase::BalanceLoaded);
    let session = h.controller.session();
    assert_eq!(session.account, Some(account_abc()));
    assert_eq!(session.balance, Some(U256::from(5)));
}

#[tokio::test]
async fn test_deposit_success_refreshes_balance_and_logs() {
    let h = connected(FakeLedger::with_balance(5)).await;

    let outcome = h.controller.submit_deposit(2).await;
    let SubmitOutcome::Completed(record) = outcome else {
        panic!("expected a completed deposit");
    };
    assert_eq!(record.outcome, Outcome::Success);
    assert!(record.tx_hash.is_some());

    assert_eq!(h.controller.session().balance, Some(U256::from(7)));
    assert_eq!(h.ledger.balance(), U256::from(7));

    let history = h.controller.history();
    let first = &history[0];
    assert_eq!(first.operation, Operation::Deposit);
    assert_eq!(first.amount, Amount::from(2));
    assert_eq!(first.outcome, Outcome::Success);
    assert_eq!(first.timestamp.date_naive(), Local::now().date_naive());

    let status = h.controller.last_status().unwrap();
    assert_eq!(status.message, "Deposit success");
}

#[tokio::test]
async fn test_rejected_withdrawal_keeps_balance() {
    let h = connected(FakeLedger::with_balance(5)).await;

    let outcome = h.controller.submit_withdraw(100).await;
    assert!(matches!(outcome, SubmitOutcome::Completed(ref r) if r.outcome == Outcome::Failed));

    assert_eq!(h.controller.session().balance, Some(U256::from(5)));
    let first = &h.controller.history()[0];
    assert_eq!(first.operation, Operation::Withdrawal);
    assert_eq!(first.amount, Amount::from(100));
    assert_eq!(first.outcome, Outcome::Failed);
    assert!(first.tx_hash.is_none());
    assert_eq!(h.controller.last_status().unwrap().message, "Withdrawal failed");
}

#[tokio::test]
async fn test_revert_at_finality_is_failure_with_hash() {
    let h = connected(FakeLedger::with_balance(5)).await;
    h.ledger.revert_on_finality.store(true, Ordering::SeqCst);

    let outcome = h.controller.submit_deposit(1).await;
    let SubmitOutcome::Completed(record) = outcome else {
        panic!("expected a completed attempt");
    };
    assert_eq!(record.outcome, Outcome::Failed);
    assert!(record.tx_hash.is_some());
    assert_eq!(h.controller.last_status().unwrap().message, "Deposit failed");
    assert_eq!(h.controller.session().balance, Some(U256::from(5)));
}

#[tokio::test]
async fn test_signing_rejection_is_failure() {
    let h = connected(FakeLedger::with_balance(5)).await;
    h.ledger.reject_submissions.store(true, Ordering::SeqCst);

    h.controller.submit_withdraw(1).await;
    let first = &h.controller.history()[0];
    assert_eq!(first.outcome, Outcome::Failed);
    assert_eq!(h.controller.last_status().unwrap().message, "Withdrawal failed");
}

#[tokio::test]
async fn test_balance_tracks_ledger_after_each_operation() {
    let h = connected(FakeLedger::with_balance(10)).await;

    for (deposit, units) in [(true, 3), (false, 4), (true, 1), (false, 10)] {
        if deposit {
            h.controller.submit_deposit(units).await;
        } else {
            h.controller.submit_withdraw(units).await;
        }
        assert_eq!(h.controller.session().balance, Some(h.ledger.balance()));
    }
    assert_eq!(h.ledger.balance(), U256::ZERO);
}

#[tokio::test]
async fn test_log_is_newest_first() {
    let h = connected(FakeLedger::with_balance(10)).await;

    h.controller.submit_deposit(1).await;
    h.controller.submit_withdraw(2).await;
    h.controller.submit_deposit(3).await;

    let amounts: Vec<_> = h.controller.history().iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![Amount::from(3), Amount::from(2), Amount::from(1)]);
    let history = h.controller.history();
    assert!(history[0].timestamp >= history[2].timestamp);
}

#[tokio::test]
async fn test_invalid_amounts_are_ignored() {
    let h = connected(FakeLedger::with_balance(5)).await;

    for input in ["0", "-2", "abc", "", "1.5"] {
        assert_eq!(h.controller.submit_deposit(input).await, SubmitOutcome::Skipped);
        assert_eq!(h.controller.submit_withdraw(input).await, SubmitOutcome::Skipped);
    }
    assert!(h.controller.history().is_empty());
    assert!(h.controller.last_status().is_none());
    assert_eq!(h.controller.session().balance, Some(U256::from(5)));
}

#[tokio::test]
async fn test_clear_history_twice() {
    let h = connected(FakeLedger::with_balance(5)).await;
    h.controller.submit_deposit(1).await;
    h.controller.submit_withdraw(50).await;
    assert_eq!(h.controller.history().len(), 2);

    h.controller.clear_history();
    assert!(h.controller.history().is_empty());
    h.controller.clear_history();
    assert!(h.controller.history().is_empty());
    // Status is not part of the history.
    assert_eq!(h.controller.last_status().unwrap().message, "Withdrawal failed");
}

#[tokio::test]
async fn test_balance_fetch_failure_keeps_last_balance() {
    let h = connected(FakeLedger::with_balance(5)).await;
    h.ledger.fail_balance_reads.store(true, Ordering::SeqCst);

    let err = h.controller.fetch_balance().await.unwrap_err();
    assert!(matches!(err, SessionError::RemoteCallFailed(_)));
    assert_eq!(h.controller.session().balance, Some(U256::from(5)));

    // A confirmed deposit is a success even when the refresh fails.
    let outcome = h.controller.submit_deposit(2).await;
    assert!(matches!(outcome, SubmitOutcome::Completed(ref r) if r.outcome == Outcome::Success));
    assert_eq!(h.controller.session().balance, Some(U256::from(5)));

    h.ledger.fail_balance_reads.store(false, Ordering::SeqCst);
    h.controller.fetch_balance().await.unwrap();
    assert_eq!(h.controller.session().balance, Some(U256::from(7)));
}

#[tokio::test]
async fn test_ready_retries_balance_after_failure() {
    let ledger = FakeLedger::with_balance(5);
    ledger.fail_balance_reads.store(true, Ordering::SeqCst);
    let h = harness(wallet(FakeWallet::granting(account_abc())), ledger);
    h.controller.detect_wallet().await;
    h.controller.connect().await.unwrap();

    assert_eq!(h.controller.advance().await, SessionPhase::Ready);
    h.ledger.fail_balance_reads.store(false, Ordering::SeqCst);
    assert_eq!(h.controller.advance().await, SessionPhase::BalanceLoaded);
}

#[tokio::test]
async fn test_redetect_picks_up_authorized_account_once() {
    let h = harness(
        wallet(FakeWallet::already_authorized(account_abc())),
        FakeLedger::with_balance(5),
    );

    assert_eq!(h.controller.detect_wallet().await, SessionPhase::WalletDetected);
    assert_eq!(h.controller.detect_wallet().await, SessionPhase::Ready);
    assert_eq!(h.controller.session().account, Some(account_abc()));

    // Same account again: the ledger proxy is not rebuilt.
    h.controller.detect_wallet().await;
    h.controller.connect().await.unwrap();
    h.controller.advance().await;
    h.controller.advance().await;
    assert_eq!(h.connector.connects.load(Ordering::SeqCst), 1);
    assert_eq!(h.ledger.balance_reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_account_switch_rebinds_ledger_and_reloads_balance() {
    let fake = Arc::new(FakeWallet::granting(account_abc()));
    let provider: Arc<dyn WalletProvider> = fake.clone();
    let h = harness(Some(provider), FakeLedger::with_balance(5));
    h.controller.detect_wallet().await;
    h.controller.connect().await.unwrap();
    assert_eq!(h.controller.advance().await, SessionPhase::BalanceLoaded);

    fake.switch_to(account_def());
    assert_eq!(h.controller.detect_wallet().await, SessionPhase::Ready);

    let session = h.controller.session();
    assert_eq!(session.account, Some(account_def()));
    assert!(session.balance.is_none());
    assert!(session.ledger.is_some());
    assert_eq!(h.connector.connects.load(Ordering::SeqCst), 2);

    assert_eq!(h.controller.advance().await, SessionPhase::BalanceLoaded);
    assert_eq!(h.controller.session().balance, Some(U256::from(5)));
    assert_eq!(h.ledger.balance_reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_submission_is_rejected_while_in_flight() {
    let gate = Arc::new(Notify::new());
    let h = connected(FakeLedger::with_balance(5).gated(gate.clone())).await;

    let controller = h.controller.clone();
    let first = tokio::spawn(async move { controller.submit_deposit(2).await });

    h.ledger.submitted.notified().await;
    assert!(h.controller.is_busy());

    assert_eq!(h.controller.submit_withdraw(1).await, SubmitOutcome::Busy);
    assert_eq!(h.controller.submit_deposit(1).await, SubmitOutcome::Busy);
    assert!(h.controller.history().is_empty());
    assert!(h.controller.last_status().is_none());

    gate.notify_one();
    let outcome = first.await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Completed(ref r) if r.outcome == Outcome::Success));
    assert!(!h.controller.is_busy());
    assert_eq!(h.controller.history().len(), 1);
    assert_eq!(h.controller.session().balance, Some(U256::from(7)));

    // The next submission goes through once the first finished.
    gate.notify_one();
    let outcome = h.controller.submit_withdraw(1).await;
    assert!(matches!(outcome, SubmitOutcome::Completed(ref r) if r.outcome == Outcome::Success));
}
