//! # Spendview CLI
//!
//! Interactive shell over a seeded in-memory API.
//!
//! ## Usage
//! ```bash
//! # 3 employees, 12 transactions (defaults)
//! cargo run -p spendview-cli
//!
//! # Larger dataset, explicit config file, slow API
//! SPENDVIEW_API_LATENCY_MS=400 cargo run -p spendview-cli -- \
//!     --employees 5 --transactions 40 --config ./spendview.toml
//! ```
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  config ──► tracing ──► seed Dataset ──► InMemoryApi ──► Orchestrator   │
//! │                                                              │          │
//! │                        stdin line ──► Command ──────────────►│          │
//! │                                                              ▼          │
//! │                                                    rendered snapshot    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod command;
mod render;
mod seed;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use spendview_client::{ClientConfig, InMemoryApi, ViewOrchestrator, ViewSnapshot};
use spendview_core::ViewSelection;

use crate::command::{Command, HELP};

#[derive(Debug, Parser)]
#[command(name = "spendview", version, about = "Review and approve card transactions")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of seeded employees
    #[arg(long, default_value_t = 3)]
    employees: usize,

    /// Number of seeded transactions
    #[arg(long, default_value_t = 12)]
    transactions: usize,

    /// Transactions per page (overrides the config file)
    #[arg(long)]
    page_size: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::load(Some(path.clone()))
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClientConfig::load_or_default(None),
    };
    init_tracing(&config.logging.filter);

    let config = with_overrides(&cli, config)?;
    let page_size = config.page_size();
    let dataset = seed::generate(cli.employees, cli.transactions, page_size)
        .context("seeding dataset")?;
    info!(
        employees = cli.employees,
        transactions = cli.transactions,
        page_size,
        "Dataset seeded"
    );

    let api = Arc::new(InMemoryApi::with_config(dataset, &config));
    let view = ViewOrchestrator::new(api, &config);

    let snapshot = view.activate().await;
    print!("{}", render::snapshot(&snapshot, &view.employee_options().await));
    println!("{}", HELP);

    run_shell(&view).await?;

    info!("Goodbye");
    Ok(())
}

/// Applies command-line overrides and validates the merged config.
fn with_overrides(cli: &Cli, mut config: ClientConfig) -> Result<ClientConfig> {
    if let Some(page_size) = cli.page_size {
        config.api.page_size = page_size;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Reads commands until `quit`, end of input or Ctrl+C.
async fn run_shell(view: &ViewOrchestrator) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if !execute(view, command).await {
            break;
        }
    }

    Ok(())
}

/// Runs one command and prints the result. Returns false on `quit`.
async fn execute(view: &ViewOrchestrator, command: Command) -> bool {
    let snapshot = match command {
        Command::All => view.select(ViewSelection::AllEmployees).await,
        Command::Employee(id) => view.select(ViewSelection::from_employee_id(&id)).await,
        Command::More => {
            let snapshot = view.load_next_page().await;
            if !snapshot.selection.is_all_employees() {
                println!("'more' only applies to all employees");
            }
            snapshot
        }
        Command::Approve(id) => set_approval(view, &id, true).await,
        Command::Unapprove(id) => set_approval(view, &id, false).await,
        Command::Reload => view.reload().await,
        Command::Employees => {
            print!("{}", render::employee_options(&view.employee_options().await));
            return true;
        }
        Command::Help => {
            println!("{}", HELP);
            return true;
        }
        Command::Quit => return false,
    };

    print!("{}", render::snapshot(&snapshot, &view.employee_options().await));
    true
}

async fn set_approval(view: &ViewOrchestrator, transaction_id: &str, approved: bool) -> ViewSnapshot {
    match view.set_transaction_approval(transaction_id, approved).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(transaction_id, error = %e, "Approval not saved");
            println!("Approval not saved: {}", e);
            view.snapshot().await
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
