//! Session error taxonomy.

use thiserror::Error;

use crate::ledger::LedgerError;
use crate::wallet::WalletError;

/// Errors surfaced by the session controller.
///
/// The first two degrade the presented state; remote failures during a
/// deposit or withdrawal never reach the caller, they become Failed records.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A wallet is required to connect")]
    WalletUnavailable,

    #[error("No account found")]
    NoAuthorizedAccount,

    #[error("Remote call failed: {0}")]
    RemoteCallFailed(String),
}

impl From<WalletError> for SessionError {
    fn from(err: WalletError) -> Self {
        SessionError::RemoteCallFailed(err.to_string())
    }
}

impl From<LedgerError> for SessionError {
    fn from(err: LedgerError) -> Self {
        SessionError::RemoteCallFailed(err.to_string())
    }
}
