mod config;
mod ingest;

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ulog_store::{LogReader, Payload, Store, Token};

use crate::config::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so exported lines on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Write {
            file,
            code,
            severity,
            channel,
            payload,
            at,
            store,
        } => {
            let payload = payload
                .as_deref()
                .map(serde_json::from_str::<Payload>)
                .transpose()
                .context("--payload must be a JSON object")?;

            let mut log = Store::open(&file, store.to_config())
                .with_context(|| format!("failed to open {}", file.display()))?;
            let len = log.write(
                code,
                Token::from(severity),
                Token::from(channel),
                payload.as_ref(),
                at,
            )?;
            info!(code = code, len = len, "Wrote event");
        }

        Command::Ingest { file, store } => {
            let mut log = Store::open(&file, store.to_config())
                .with_context(|| format!("failed to open {}", file.display()))?;
            let written = ingest::ingest(&mut log, io::stdin().lock())?;
            info!(written = written, path = %file.display(), "Ingested events");
        }

        Command::Export {
            file,
            min_severity,
            since,
        } => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let summary = LogReader::open(&file)
                .export(&mut out, min_severity, since)
                .with_context(|| format!("failed to export {}", file.display()))?;
            out.flush()?;

            if summary.bad_crc > 0 {
                warn!(bad_crc = summary.bad_crc, "Export contains damaged records");
            }
            if summary.truncated {
                warn!("Log ends in an incomplete record");
            }
            info!(
                emitted = summary.emitted,
                filtered = summary.filtered,
                "Export finished"
            );
        }

        Command::Stat { file } => {
            let stats = LogReader::open(&file)
                .stats()
                .with_context(|| format!("failed to read {}", file.display()))?;

            println!("file:        {}", file.display());
            println!("bytes:       {}", stats.bytes);
            println!("blocks:      {}", stats.blocks);
            println!("records:     {}", stats.records);
            println!("bad crc:     {}", stats.bad_crc);
            println!("bad payload: {}", stats.bad_payload);
            println!("truncated:   {}", if stats.truncated { "yes" } else { "no" });
        }
    }

    Ok(())
}
