//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trade statistics store maintenance tool
#[derive(Parser, Debug)]
#[command(name = "tradestat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Store file; overrides TRADESTAT_DB_PATH and TRADESTAT_DEPLOYMENT
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Mirror log lines to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the schema if needed and print the store path
    Init,

    /// Insert one record from a JSON object of column values
    Create {
        /// e.g. '{"hs_2_code":"01","year":2023,"export_volume":100.5}'
        fields: String,
    },

    /// Print one record as JSON
    Get { id: i64 },

    /// Delete one record; prints `true` or `false`
    Delete { id: i64 },

    /// List records filtered on indexed columns
    List {
        #[arg(long)]
        hs2: Option<String>,
        #[arg(long)]
        hs4: Option<String>,
        #[arg(long)]
        hs6: Option<String>,
        #[arg(long)]
        hs10: Option<String>,
        #[arg(long)]
        partner: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Print the number of stored records
    Count,
}
