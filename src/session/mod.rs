//! Session subsystem: the state a user sees and the operations that change it.
//!
//! # Data Flow
//! ```text
//! console command
//!     → SessionController (controller.rs)
//!         → WalletProvider (accounts, signer)
//!         → LedgerProxy (balance, deposit, withdraw, finality)
//!     → Session snapshot / TransactionLog / LastStatus
//!     → console render
//! ```

pub mod controller;
pub mod error;
pub mod history;
pub mod types;

pub use controller::SessionController;
pub use error::SessionError;
pub use history::TransactionLog;
pub use types::{
    LastStatus, Operation, Outcome, PendingAmount, Session, SessionPhase, SubmitOutcome,
    TransactionRecord,
};
