use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use ulog_store::config::DEFAULT_BLOCK_TARGET_BYTES;
use ulog_store::{Severity, StoreConfig};

#[derive(Parser)]
#[command(name = "ulog", about = "Write, export and inspect ulog binary event logs")]
pub struct Cli {
    /// Log level for diagnostics on stderr (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Options that shape how records are appended
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Record bytes per block before a new header is written
    #[arg(long, default_value_t = DEFAULT_BLOCK_TARGET_BYTES)]
    pub block_target: u64,
    /// Skip fsync after each record
    #[arg(long)]
    pub no_sync: bool,
}

impl StoreArgs {
    pub fn to_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_block_target(self.block_target)
            .with_sync_on_write(!self.no_sync)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Append a single event (opens a new block)
    Write {
        /// Log file path
        file: PathBuf,
        /// Application-defined event code
        #[arg(long)]
        code: u64,
        /// Severity name or number
        #[arg(long, default_value = "info")]
        severity: String,
        /// Channel name or number
        #[arg(long, default_value = "app")]
        channel: String,
        /// JSON object payload
        #[arg(long)]
        payload: Option<String>,
        /// Event time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Append events read as JSON lines from stdin
    Ingest {
        /// Log file path
        file: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Print events as human-readable lines
    Export {
        /// Log file path
        file: PathBuf,
        /// Drop events below this severity
        #[arg(long, default_value = "trace")]
        min_severity: Severity,
        /// Drop events before this time (RFC 3339)
        #[arg(long)]
        since: Option<DateTime<Utc>>,
    },
    /// Count blocks, records and damaged records
    Stat {
        /// Log file path
        file: PathBuf,
    },
}
