//! Console presentation layer.
//!
//! # Data Flow
//! ```text
//! stdin line
//!     → command.rs (parse)
//!     → ConsoleSession::handle_line
//!         → SessionController operation
//!         → Submission (deposit/withdraw, run in the background)
//!     → render.rs (screen from a fresh snapshot)
//!     → stdout
//! ```
//!
//! Deposits and withdrawals run as background tasks so the prompt stays
//! usable while a transaction waits for finality, as the buttons of a web
//! page would.

pub mod command;
pub mod render;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::ConsoleConfig;
use crate::session::{
    Operation, PendingAmount, SessionController, SessionError, SubmitOutcome,
};

pub use command::{Command, CommandError, HELP};
pub use render::{render_history, render_screen, Screen};

/// What the read loop should do after a line.
#[derive(Debug)]
pub enum Flow {
    /// Print the text and read the next line.
    Continue(String),
    /// Print the text, run the submission in the background, keep reading.
    Background(String, Submission),
    Quit,
}

/// A deposit or withdrawal ready to run.
#[derive(Debug)]
pub struct Submission {
    controller: Arc<SessionController>,
    config: ConsoleConfig,
    /// Shared with the console so the final screen shows the current input.
    pending: Arc<Mutex<PendingAmount>>,
    operation: Operation,
    amount: PendingAmount,
}

impl Submission {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Run to completion and render the resulting screen.
    pub async fn run(self) -> String {
        let outcome = match self.operation {
            Operation::Deposit => self.controller.submit_deposit(self.amount).await,
            Operation::Withdrawal => self.controller.submit_withdraw(self.amount).await,
        };

        let mut out = String::new();
        match outcome {
            SubmitOutcome::Busy => {
                out.push_str("Another transaction is still pending.\n");
            }
            SubmitOutcome::Skipped => {}
            SubmitOutcome::Completed(_) => {
                self.controller.advance().await;
            }
        }
        out.push_str(&screen_for(&self.controller, &self.config, &lock(&self.pending)));
        out
    }
}

/// Interactive session: the controller plus the console's own input state.
#[derive(Debug)]
pub struct ConsoleSession {
    controller: Arc<SessionController>,
    config: ConsoleConfig,
    pending: Arc<Mutex<PendingAmount>>,
}

impl ConsoleSession {
    pub fn new(controller: Arc<SessionController>, config: ConsoleConfig) -> Self {
        Self {
            controller,
            config,
            pending: Arc::new(Mutex::new(PendingAmount::default())),
        }
    }

    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    /// Current amount input.
    pub fn pending(&self) -> PendingAmount {
        lock(&self.pending).clone()
    }

    /// Detect the wallet, run automatic transitions and draw the first screen.
    pub async fn start(&self) -> String {
        self.controller.detect_wallet().await;
        self.controller.advance().await;
        self.screen()
    }

    pub fn screen(&self) -> String {
        screen_for(&self.controller, &self.config, &lock(&self.pending))
    }

    pub async fn handle_line(&mut self, line: &str) -> Flow {
        match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(CommandError::Empty) => Flow::Continue(self.screen()),
            Err(e) => Flow::Continue(format!("{}\n", e)),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Flow {
        let notice = match command {
            Command::Connect => match self.controller.connect().await {
                Ok(_) => None,
                Err(SessionError::WalletUnavailable) => {
                    Some("A wallet is required to connect.".to_string())
                }
                Err(SessionError::NoAuthorizedAccount) => Some("No account found.".to_string()),
                Err(e) => Some(format!("Connect failed: {}", e)),
            },
            Command::Detect => {
                self.controller.detect_wallet().await;
                None
            }
            Command::Amount(amount) => {
                *lock(&self.pending) = amount;
                None
            }
            Command::Deposit(amount) => return self.submission(Operation::Deposit, amount),
            Command::Withdraw(amount) => return self.submission(Operation::Withdrawal, amount),
            Command::Balance => match self.controller.fetch_balance().await {
                Ok(_) => None,
                Err(e) => Some(format!("Could not refresh balance: {}", e)),
            },
            Command::History => {
                return Flow::Continue(render_history(&self.controller.history()));
            }
            Command::Export => return Flow::Continue(self.export()),
            Command::Clear => {
                self.controller.clear_history();
                None
            }
            Command::Help => return Flow::Continue(format!("{}\n", HELP)),
            Command::Quit => return Flow::Quit,
        };

        self.controller.advance().await;

        let mut out = String::new();
        if let Some(notice) = notice {
            out.push_str(&notice);
            out.push('\n');
        }
        out.push_str(&self.screen());
        Flow::Continue(out)
    }

    /// Transaction log as pretty JSON, newest first.
    pub fn export(&self) -> String {
        match serde_json::to_string_pretty(&self.controller.history()) {
            Ok(json) => format!("{}\n", json),
            Err(e) => format!("Export failed: {}\n", e),
        }
    }

    fn submission(&self, operation: Operation, amount: Option<PendingAmount>) -> Flow {
        let amount = amount.unwrap_or_else(|| self.pending());
        let notice = format!("{} of {} requested.\n", operation, amount);
        Flow::Background(
            notice,
            Submission {
                controller: self.controller.clone(),
                config: self.config.clone(),
                pending: Arc::clone(&self.pending),
                operation,
                amount,
            },
        )
    }
}

fn screen_for(
    controller: &SessionController,
    config: &ConsoleConfig,
    pending: &PendingAmount,
) -> String {
    let session = controller.session();
    let status = controller.last_status();
    let history = controller.history();
    render_screen(&Screen {
        config,
        session: &session,
        pending,
        status: status.as_ref(),
        history: &history,
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
