//! Text rendering of a session snapshot.

use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::config::ConsoleConfig;
use crate::session::{LastStatus, Outcome, PendingAmount, Session, SessionPhase, TransactionRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

pub const INSTALL_PROMPT: &str = "Please install a wallet to use this ATM.";
pub const CONNECT_PROMPT: &str = "Please connect your wallet (type 'connect').";

/// Everything a screen is drawn from.
#[derive(Debug)]
pub struct Screen<'a> {
    pub config: &'a ConsoleConfig,
    pub session: &'a Session,
    pub pending: &'a PendingAmount,
    pub status: Option<&'a LastStatus>,
    pub history: &'a [TransactionRecord],
}

pub fn format_date(timestamp: &DateTime<Local>) -> String {
    timestamp.format(DATE_FORMAT).to_string()
}

pub fn format_time(timestamp: &DateTime<Local>) -> String {
    timestamp.format(TIME_FORMAT).to_string()
}

/// Render the full screen for the current phase.
pub fn render_screen(screen: &Screen<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", screen.config.title);

    match screen.session.phase() {
        SessionPhase::Uninitialized => {
            let _ = writeln!(out, "{}", INSTALL_PROMPT);
            return out;
        }
        SessionPhase::WalletDetected => {
            let _ = writeln!(out, "{}", CONNECT_PROMPT);
            return out;
        }
        _ => {}
    }

    if let Some(account) = screen.session.account {
        let _ = writeln!(out, "Your Account: {}", account);
    }
    if let Some(holder) = &screen.config.account_holder {
        let _ = writeln!(out, "Account Holder: {}", holder);
    }
    match screen.session.balance {
        Some(balance) => {
            let _ = writeln!(
                out,
                "Your Balance: {} {}",
                balance, screen.config.currency_symbol
            );
        }
        None => {
            let _ = writeln!(out, "Your Balance: loading...");
        }
    }
    let _ = writeln!(out, "Amount: {}", screen.pending);

    if let Some(status) = screen.status {
        let _ = writeln!(out, "{}", render_status(status));
    }

    if !screen.history.is_empty() {
        out.push('\n');
        out.push_str(&render_history(screen.history));
    }
    out
}

/// `Transaction Status: <message> | Time: <time> | Date: <date>`
pub fn render_status(status: &LastStatus) -> String {
    format!(
        "Transaction Status: {} | Time: {} | Date: {}",
        status.message,
        format_time(&status.timestamp),
        format_date(&status.timestamp)
    )
}

/// Newest-first table of transaction records.
pub fn render_history(records: &[TransactionRecord]) -> String {
    if records.is_empty() {
        return "No transactions yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12}{:>10}  {:<9}{:<12}{:<8}",
        "Type", "Amount", "Status", "Date", "Time"
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:<12}{:>10}  {:<9}{:<12}{:<8}",
            record.operation.as_str(),
            record.amount.to_string(),
            outcome_label(record.outcome),
            format_date(&record.timestamp),
            format_time(&record.timestamp)
        );
    }
    out
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Success => "Success",
        Outcome::Failed => "Failed",
    }
}
