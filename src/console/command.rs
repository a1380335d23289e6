//! Console command parsing.

use std::str::FromStr;
use thiserror::Error;

use crate::session::PendingAmount;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Detect,
    /// Set the pending amount input.
    Amount(PendingAmount),
    /// Deposit the given amount, or the pending amount when omitted.
    Deposit(Option<PendingAmount>),
    /// Withdraw the given amount, or the pending amount when omitted.
    Withdraw(Option<PendingAmount>),
    Balance,
    History,
    Export,
    Clear,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("'{0}' needs an amount")]
    MissingArgument(&'static str),
    #[error("'{0}' takes no arguments")]
    UnexpectedArgument(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };
        let argument = words.next().map(PendingAmount::from);
        let extra = words.next().is_some();

        let command = match verb.to_ascii_lowercase().as_str() {
            "connect" => no_args("connect", argument, Command::Connect)?,
            "detect" | "refresh" => no_args("detect", argument, Command::Detect)?,
            "amount" => Command::Amount(argument.ok_or(CommandError::MissingArgument("amount"))?),
            "deposit" => Command::Deposit(argument),
            "withdraw" => Command::Withdraw(argument),
            "balance" => no_args("balance", argument, Command::Balance)?,
            "history" => no_args("history", argument, Command::History)?,
            "export" => no_args("export", argument, Command::Export)?,
            "clear" => no_args("clear", argument, Command::Clear)?,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        if extra {
            let name = match command {
                Command::Amount(_) => "amount",
                Command::Deposit(_) => "deposit",
                Command::Withdraw(_) => "withdraw",
                _ => "command",
            };
            return Err(CommandError::UnexpectedArgument(name));
        }
        Ok(command)
    }
}

fn no_args(
    name: &'static str,
    argument: Option<PendingAmount>,
    command: Command,
) -> Result<Command, CommandError> {
    match argument {
        Some(_) => Err(CommandError::UnexpectedArgument(name)),
        None => Ok(command),
    }
}

pub const HELP: &str = "\
Commands:
  connect            connect the wallet account
  detect             look for the wallet again and pick up authorized accounts
  amount <n>         set the amount used by deposit/withdraw
  deposit [n]        deposit n (or the set amount)
  withdraw [n]       withdraw n (or the set amount)
  balance            refresh the balance
  history            show past transactions
  export             print past transactions as JSON
  clear              clear the transaction history
  quit               leave";
