use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inscribe_ledger::models::Balance;
use inscribe_ledger::{audit, Database, StoreConfig, TableKind};

#[derive(Parser, Debug)]
#[command(name = "inscribe-ledger")]
#[command(about = "Inspect and provision the inscription ledger store")]
struct Cli {
    /// Database file path (overrides the loaded config)
    #[arg(long, env = "LEDGER_DATABASE_PATH")]
    database: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "LEDGER_LOG_JSON", default_value = "false")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create all tables and indexes that do not exist yet
    Init,
    /// Drop and recreate every ledger table except the event log
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Drop and recreate one table
    ResetTable {
        table: TableKind,
        #[arg(long)]
        yes: bool,
    },
    /// Row count per table
    Stats,
    Token { id: i64 },
    Balance { address: String, tid: i64 },
    /// Events of one block in on-chain order
    Events { height: i64 },
    Pending { address: String },
    Otc { id: i64 },
    OtcRecords { oid: i64 },
    AuditOtc { oid: i64 },
    AuditToken { id: i64 },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = StoreConfig::from_env().context("Failed to load store config")?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }

    if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::open(&config).context("Failed to open ledger store")?;
    let outcome = run(&db, cli.command);
    db.close().context("Failed to close ledger store")?;
    outcome
}

fn run(db: &Database, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            db.create_all_tables()?;
            tracing::info!("All tables ready");
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("reset deletes all ledger state except events; pass --yes to confirm");
            }
            db.clear_all_tables()?;
        }
        Command::ResetTable { table, yes } => {
            if !yes {
                bail!("reset-table deletes every row of {table}; pass --yes to confirm");
            }
            db.clear_table(table)?;
        }
        Command::Stats => print(&db.table_counts()?)?,
        Command::Token { id } => print(&found(db.get_token(id)?, "token", id)?)?,
        Command::Balance { address, tid } => {
            let key = Balance::id_for(&address, tid);
            print(&found(db.get_balance(&address, tid)?, "balance", key)?)?
        }
        Command::Events { height } => print(&db.get_events_by_block_height(height)?)?,
        Command::Pending { address } => {
            print(&found(db.get_pending_inscription(&address)?, "pending queue", &address)?)?
        }
        Command::Otc { id } => print(&found(db.get_otc(id)?, "otc order", id)?)?,
        Command::OtcRecords { oid } => print(&db.get_otc_records(oid)?)?,
        Command::AuditOtc { oid } => {
            let report = found(audit::audit_otc(db, oid)?, "otc order", oid)?;
            print(&report)?;
            if !report.is_ok() {
                bail!("otc order {oid} does not reconcile");
            }
        }
        Command::AuditToken { id } => {
            let report = found(audit::audit_token(db, id)?, "token", id)?;
            print(&report)?;
            if !report.is_ok() {
                bail!("token {id} does not reconcile");
            }
        }
    }
    Ok(())
}

fn found<T>(value: Option<T>, what: &str, key: impl std::fmt::Display) -> Result<T> {
    value.with_context(|| format!("{what} {key} not found"))
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inscribe_ledger=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
