//! JSON-lines input for `ulog ingest`
//!
//! One event per line:
//!
//! ```text
//! {"code": 123, "severity": "warn", "channel": "sns", "payload": {"sensor_id": 7}}
//! ```

use std::io::BufRead;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;
use ulog_store::{Clock, Payload, Store, Token};

fn default_severity() -> Token {
    Token::Name("info".to_string())
}

fn default_channel() -> Token {
    Token::Name("app".to_string())
}

/// One event as read from stdin
#[derive(Debug, Deserialize)]
pub struct IngestLine {
    pub code: u64,
    #[serde(default = "default_severity")]
    pub severity: Token,
    #[serde(default = "default_channel")]
    pub channel: Token,
    #[serde(default)]
    pub payload: Option<Payload>,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

/// Append every non-blank line of `input` to `store`, returning the count
pub fn ingest<C: Clock, R: BufRead>(store: &mut Store<C>, input: R) -> anyhow::Result<usize> {
    let mut written = 0;

    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let event: IngestLine = serde_json::from_str(&line)
            .with_context(|| format!("line {}: not a valid event", index + 1))?;

        store.write(
            event.code,
            event.severity,
            event.channel,
            event.payload.as_ref(),
            event.at,
        )?;
        written += 1;
    }

    debug!(written = written, "Ingest finished");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;
    use ulog_store::{Severity, StoreConfig};

    #[test]
    fn test_parse_line_defaults() {
        let event: IngestLine = serde_json::from_str(r#"{"code": 5}"#).unwrap();
        assert_eq!(event.code, 5);
        assert_eq!(event.severity, Token::Name("info".to_string()));
        assert_eq!(event.channel, Token::Name("app".to_string()));
        assert!(event.payload.is_none());
        assert!(event.at.is_none());
    }

    #[test]
    fn test_parse_numeric_tokens() {
        let event: IngestLine =
            serde_json::from_str(r#"{"code": 5, "severity": 6, "channel": "pwr"}"#).unwrap();
        assert_eq!(event.severity, Token::Code(6));
        assert_eq!(event.channel, Token::Name("pwr".to_string()));
    }

    #[test]
    fn test_ingest_into_store() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(dir.path().join("in.ulog"), StoreConfig::testing()).unwrap();

        let input = concat!(
            r#"{"code": 123, "severity": "warn", "channel": "sns", "payload": {"sensor_id": 7}}"#,
            "\n\n",
            r#"{"code": 45, "severity": "info", "channel": "net", "at": "2024-05-01T12:00:00.250Z"}"#,
            "\n",
        );
        let written = ingest(&mut store, Cursor::new(input)).unwrap();
        assert_eq!(written, 2);

        let mut out = Vec::new();
        store.export(&mut out, Severity::Trace, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("#-123-warn-sns-"));
        assert!(lines[1].starts_with("#-45-info-net-"));
    }

    #[test]
    fn test_bad_line_reports_position() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(dir.path().join("in.ulog"), StoreConfig::testing()).unwrap();

        let input = "{\"code\": 1}\n{\"severity\": \"warn\"}\n";
        let err = ingest(&mut store, Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
