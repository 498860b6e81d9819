use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use supplier_dealer::config::HostConfig;
use supplier_dealer::ledger::{FileLedger, Ledger, MemoryLedger};
use supplier_dealer::storage::StorageEngine;
use supplier_dealer::{Host, SupplierDealer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "supplier-dealer")]
#[command(about = "Drive the supplier/dealer record store against a local ledger")]
struct Cli {
    /// Ledger snapshot file; defaults to $SUPPLIER_DEALER_LEDGER. Without one
    /// the command runs against a freshly deployed in-memory ledger.
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the ChatLog and Order tables
    Init,
    /// Run a state-mutating operation, e.g. `invoke sendMessage alice hello`
    Invoke {
        function: String,
        args: Vec<String>,
    },
    /// Run a read-only operation, e.g. `query readMessages`
    Query {
        function: String,
        args: Vec<String>,
    },
    /// List the tables the chaincode defines and whether they exist
    Tables,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = HostConfig::from_env();
    if let Some(path) = cli.ledger {
        config = config.ledger_path(path);
    }
    if let Some(filter) = cli.log.as_deref() {
        config = config.log_filter(filter);
    }
    init_tracing(&config.log_filter);

    tracing::debug!(name = %config.name, ledger = ?config.ledger_path, "host starting");

    match &config.ledger_path {
        Some(path) => {
            let ledger = FileLedger::open(path)
                .with_context(|| format!("failed to open ledger {}", path.display()))?;
            run(Host::supplier_dealer(ledger), cli.command)
        }
        None => {
            tracing::warn!("no ledger path configured, state is discarded on exit");
            let host = if matches!(cli.command, Command::Init) {
                Host::supplier_dealer(MemoryLedger::new())
            } else {
                Host::deploy(MemoryLedger::new(), SupplierDealer::new())
                    .context("initialization failed")?
            };
            run(host, cli.command)
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run<L: Ledger>(mut host: Host<L>, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            host.init("init", &[]).context("initialization failed")?;
            println!(
                "Initialized tables: {}",
                host.chaincode().catalog().list_tables().join(", ")
            );
        }
        Command::Invoke { function, args } => {
            let payload = host
                .invoke(&function, &args)
                .with_context(|| format!("invoke {} failed", function))?;
            print_payload(&payload)?;
        }
        Command::Query { function, args } => {
            let payload = host
                .query(&function, &args)
                .with_context(|| format!("query {} failed", function))?;
            print_payload(&payload)?;
        }
        Command::Tables => {
            for table in host.chaincode().catalog().definitions() {
                let status = if host.ledger().table_exists(&table.name)? {
                    "created"
                } else {
                    "missing"
                };
                let columns: Vec<String> = table
                    .columns
                    .iter()
                    .map(|c| format!("{}:{}", c.name, c.data_type))
                    .collect();
                println!("{} ({}) [{}]", table.name, columns.join(", "), status);
            }
        }
    }
    Ok(())
}

fn print_payload(payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(payload)?;
    writeln!(stdout)?;
    Ok(())
}
