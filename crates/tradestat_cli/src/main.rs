//! `tradestat` entry point.
//!
//! # Responsibility
//! - Act as the host-process startup routine for the persistence layer:
//!   logging, store resolution, schema bootstrap.
//! - Expose record operations for local inspection and scripting.

mod args;

use anyhow::{bail, Context, Result};
use args::{Cli, Command};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use tradestat_core::{
    create_record, default_log_level, delete_record, init_logging, init_store, StoreConfig,
    TradeRecordQuery, TradeRecordRepository,
};

const LOG_DIR_NAME: &str = "tradestat-logs";

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    start_logging(&cli);

    let config = match &cli.db {
        Some(path) => StoreConfig::at(path.clone()),
        None => StoreConfig::from_env(),
    }
    .context("failed to resolve store location")?;
    let factory = init_store(&config).context("failed to prepare store")?;

    match cli.command {
        Command::Init => println!("{}", factory.db_path().display()),
        Command::Create { fields } => {
            let value: serde_json::Value =
                serde_json::from_str(&fields).context("fields must be valid JSON")?;
            let Some(fields) = value.as_object() else {
                bail!("fields must be a JSON object");
            };
            let record = factory.with_session(|session| create_record(session, fields))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Get { id } => {
            let record = factory.with_session(|session| session.trade_records().get_record(id))?;
            match record {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => bail!("trade record {id} not found"),
            }
        }
        Command::Delete { id } => {
            let deleted = factory.with_session(|session| delete_record(session, id))?;
            println!("{deleted}");
        }
        Command::List {
            hs2,
            hs4,
            hs6,
            hs10,
            partner,
            year,
            limit,
            offset,
        } => {
            let query = TradeRecordQuery {
                hs_2_code: hs2,
                hs_4_code: hs4,
                hs_6_code: hs6,
                hs_10_code: hs10,
                trading_partner: partner,
                year,
                limit,
                offset,
            };
            let records =
                factory.with_session(|session| session.trade_records().list_records(&query))?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Count => {
            let total =
                factory.with_session(|session| session.trade_records().count_records())?;
            println!("{total}");
        }
    }
    Ok(())
}

// Logging problems never stop the command itself.
fn start_logging(cli: &Cli) {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_DIR_NAME));
    let log_dir = absolute(log_dir);

    if let Err(err) = init_logging(level, &log_dir.to_string_lossy(), cli.verbose) {
        eprintln!("warning: logging disabled: {err}");
        return;
    }
    if cli.db.is_some() {
        info!("event=store_resolve module=cli status=ok source=flag");
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&path))
        .unwrap_or(path)
}
