//! ATM console (v1)
//!
//! Terminal front-end for a deployed ATM contract built with Tokio and alloy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────────────┐
//!                 │                      ATM CONSOLE                       │
//!   stdin         │  ┌─────────┐    ┌────────────────────┐                 │
//!   ──────────────┼─▶│ console │───▶│ session controller │                 │
//!                 │  │ command │    │  (state machine)   │                 │
//!                 │  └─────────┘    └───┬────────────┬───┘                 │
//!                 │                     │            │                     │
//!                 │                     ▼            ▼                     │
//!                 │              ┌──────────┐  ┌──────────┐                │     JSON-RPC
//!                 │              │  wallet  │  │  ledger  │◀───────────────┼──── ATM contract
//!                 │              │ (signer) │─▶│ (alloy)  │                │
//!                 │              └──────────┘  └──────────┘                │
//!   stdout        │  ┌─────────┐                                           │
//!   ◀─────────────┼──│ render  │◀── session snapshot, log, status          │
//!                 │  └─────────┘                                           │
//!                 │                                                        │
//!                 │  config (TOML + CLI)      observability (logs, metrics)│
//!                 └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use atm_console::config::{load_config, validation::validate_config, AtmConfig, ConfigError};
use atm_console::console::{ConsoleSession, Flow};
use atm_console::ledger::ContractConnector;
use atm_console::observability::{logging, metrics};
use atm_console::session::SessionController;
use atm_console::wallet::EnvWalletDetector;

#[derive(Parser, Debug)]
#[command(name = "atm-console")]
#[command(about = "Deposit to and withdraw from a deployed ATM contract", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults target a local development node.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint override.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Contract address override.
    #[arg(long)]
    contract: Option<String>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn resolve_config(&self) -> Result<AtmConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AtmConfig::default(),
        };

        if let Some(rpc_url) = &self.rpc_url {
            config.ledger.rpc_url = rpc_url.clone();
        }
        if let Some(contract) = &self.contract {
            config.ledger.contract_address = contract.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        rpc_url = %config.ledger.rpc_url,
        chain_id = config.ledger.chain_id,
        contract = %config.ledger.contract_address,
        confirmation_blocks = config.ledger.confirmation_blocks,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let detector = EnvWalletDetector::new(&config.wallet, config.ledger.chain_id);
    let connector = ContractConnector::new(config.ledger.clone())?;
    let controller = Arc::new(SessionController::new(
        Arc::new(detector),
        Arc::new(connector),
    ));

    let mut console = ConsoleSession::new(controller, config.console.clone());
    print!("{}", console.start().await);
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match console.handle_line(&line).await {
            Flow::Continue(output) => print!("{}", output),
            Flow::Background(notice, submission) => {
                print!("{}", notice);
                tokio::spawn(async move {
                    print!("{}", submission.run().await);
                });
            }
            Flow::Quit => break,
        }
    }

    if console.controller().is_busy() {
        tracing::warn!("Leaving with a transaction still awaiting finality");
    }
    tracing::info!("Session ended");
    Ok(())
}
