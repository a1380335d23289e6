//! ATM console library: wallet connection and transaction lifecycle for a
//! deployed ATM contract.

pub mod config;
pub mod console;
pub mod ledger;
pub mod observability;
pub mod session;
pub mod wallet;

pub use config::AtmConfig;
pub use console::ConsoleSession;
pub use session::SessionController;
