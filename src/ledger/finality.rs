//! Confirmation monitoring for submitted contract calls.
//!
//! # Responsibilities
//! - Poll receipts until the transaction is mined
//! - Detect reverted transactions
//! - Wait for the configured block depth
//! - Optionally bound the whole wait

use alloy::primitives::TxHash;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::ledger::types::{
    Confirmation, ConfirmationStatus, LedgerConfig, LedgerError, LedgerResult,
};

/// The part of a receipt finality cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub succeeded: bool,
    pub block_number: Option<u64>,
}

/// Read access to chain state needed to judge finality.
#[async_trait]
pub trait ChainView: Send + Sync {
    async fn receipt(&self, tx_hash: TxHash) -> LedgerResult<Option<ReceiptSummary>>;
    async fn block_number(&self) -> LedgerResult<u64>;
}

/// How long and how deep to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalityPolicy {
    pub confirmation_blocks: u32,
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
}

impl FinalityPolicy {
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            confirmation_blocks: config.confirmation_blocks.max(1),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            timeout: config.confirmation_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Check the current confirmation status of a transaction once.
pub async fn check_status<C>(
    chain: &C,
    tx_hash: TxHash,
    required: u32,
) -> LedgerResult<ConfirmationStatus>
where
    C: ChainView + ?Sized,
{
    let receipt = match chain.receipt(tx_hash).await? {
        Some(r) => r,
        None => return Ok(ConfirmationStatus::Pending),
    };

    if !receipt.succeeded {
        return Ok(ConfirmationStatus::Failed(format!(
            "transaction {} reverted",
            tx_hash
        )));
    }

    let current_block = chain.block_number().await?;
    let tx_block = receipt.block_number.unwrap_or(current_block);
    // The inclusion block counts as the first confirmation.
    let confirmations = current_block.saturating_sub(tx_block).saturating_add(1);
    let confirmations = u32::try_from(confirmations).unwrap_or(u32::MAX);

    if confirmations >= required {
        Ok(ConfirmationStatus::Confirmed {
            block_number: tx_block,
        })
    } else {
        Ok(ConfirmationStatus::Confirming {
            current: confirmations,
            required,
        })
    }
}

/// Wait for a transaction to be confirmed.
///
/// Without a policy timeout this waits until the chain answers one way or the
/// other.
pub async fn wait_for_finality<C>(
    chain: &C,
    tx_hash: TxHash,
    policy: &FinalityPolicy,
) -> LedgerResult<Confirmation>
where
    C: ChainView + ?Sized,
{
    let polling = poll_until_final(chain, tx_hash, policy);

    match policy.timeout {
        Some(limit) => timeout(limit, polling)
            .await
            .map_err(|_| LedgerError::ConfirmationTimeout(limit.as_secs()))?,
        None => polling.await,
    }
}

async fn poll_until_final<C>(
    chain: &C,
    tx_hash: TxHash,
    policy: &FinalityPolicy,
) -> LedgerResult<Confirmation>
where
    C: ChainView + ?Sized,
{
    let mut ticker = interval(policy.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match check_status(chain, tx_hash, policy.confirmation_blocks).await? {
            ConfirmationStatus::Confirmed { block_number } => {
                tracing::debug!(tx_hash = %tx_hash, block_number, "Transaction final");
                return Ok(Confirmation {
                    tx_hash,
                    block_number,
                });
            }
            ConfirmationStatus::Failed(reason) => return Err(LedgerError::Reverted(reason)),
            ConfirmationStatus::Pending => {
                tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
            }
            ConfirmationStatus::Confirming { current, required } => {
                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = current,
                    required = required,
                    "Waiting for confirmations"
                );
            }
        }
    }
}
