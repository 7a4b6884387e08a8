//! Severity and channel tables
//!
//! Both tables are closed enums with a fixed wire code and a lowercase name.
//! Callers hand the store a [`Token`] (a raw code or a name) which is
//! resolved to a wire code exactly once, before encoding. Names that are not
//! in the table fall back to an integer parse, then to 0.
//!
//! On the way out, codes without a table entry render as the raw integer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CodecError;

/// A closed table of named wire codes
pub trait Symbol: Copy + Sized + 'static {
    /// Every entry, in code order
    const ALL: &'static [Self];

    /// Table name used in diagnostics
    const KIND: &'static str;

    /// Wire code
    fn code(self) -> u8;

    /// Lowercase table name
    fn name(self) -> &'static str;

    fn from_code(code: u64) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|symbol| u64::from(symbol.code()) == code)
    }

    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|symbol| symbol.name().eq_ignore_ascii_case(name))
    }
}

/// Event severity, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    #[default]
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Notice = 4,
    Error = 5,
    Crit = 6,
    Alert = 7,
}

impl Symbol for Severity {
    const ALL: &'static [Self] = &[
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Notice,
        Self::Error,
        Self::Crit,
        Self::Alert,
    ];
    const KIND: &'static str = "severity";

    fn code(self) -> u8 {
        self as u8
    }

    fn name(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Notice => "notice",
            Self::Error => "error",
            Self::Crit => "crit",
            Self::Alert => "alert",
        }
    }
}

/// Subsystem that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Channel {
    Net = 0,
    Io = 1,
    Auth = 2,
    Sns = 3,
    Cfg = 4,
    Pwr = 5,
    App = 6,
    Db = 7,
    Ui = 8,
}

impl Symbol for Channel {
    const ALL: &'static [Self] = &[
        Self::Net,
        Self::Io,
        Self::Auth,
        Self::Sns,
        Self::Cfg,
        Self::Pwr,
        Self::App,
        Self::Db,
        Self::Ui,
    ];
    const KIND: &'static str = "channel";

    fn code(self) -> u8 {
        self as u8
    }

    fn name(self) -> &'static str {
        match self {
            Self::Net => "net",
            Self::Io => "io",
            Self::Auth => "auth",
            Self::Sns => "sns",
            Self::Cfg => "cfg",
            Self::Pwr => "pwr",
            Self::App => "app",
            Self::Db => "db",
            Self::Ui => "ui",
        }
    }
}

/// Strict parse: accepts a table name or a code that is in the table
fn parse_strict<S: Symbol>(s: &str) -> Result<S, CodecError> {
    S::from_name(s)
        .or_else(|| s.trim().parse::<u64>().ok().and_then(S::from_code))
        .ok_or_else(|| CodecError::unknown_symbol(format!("{} '{}'", S::KIND, s)))
}

impl FromStr for Severity {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_strict(s)
    }
}

impl FromStr for Channel {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_strict(s)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Write-time severity or channel input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    /// Raw wire code, written as given
    Code(u64),
    /// Table name, or free text holding an integer
    Name(String),
}

impl Token {
    /// Resolve to a wire code against table `S`.
    ///
    /// Lossy: an unknown name that does not parse as an integer becomes 0.
    pub fn resolve<S: Symbol>(&self) -> u64 {
        match self {
            Token::Code(code) => *code,
            Token::Name(name) => {
                if let Some(symbol) = S::from_name(name) {
                    return u64::from(symbol.code());
                }
                match name.trim().parse::<u64>() {
                    Ok(code) => code,
                    Err(_) => {
                        warn!(kind = S::KIND, token = %name, "Unknown symbol, writing 0");
                        0
                    }
                }
            }
        }
    }
}

impl From<u64> for Token {
    fn from(code: u64) -> Self {
        Token::Code(code)
    }
}

impl From<u8> for Token {
    fn from(code: u8) -> Self {
        Token::Code(u64::from(code))
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Token::Name(name.to_string())
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Token::Name(name)
    }
}

impl From<Severity> for Token {
    fn from(severity: Severity) -> Self {
        Token::Code(u64::from(severity.code()))
    }
}

impl From<Channel> for Token {
    fn from(channel: Channel) -> Self {
        Token::Code(u64::from(channel.code()))
    }
}

/// Display adapter: the table name for `code`, or the integer itself
pub struct SymbolName<S: Symbol> {
    code: u64,
    _marker: std::marker::PhantomData<S>,
}

impl<S: Symbol> SymbolName<S> {
    /// Wrap `code` for display
    pub fn new(code: u64) -> Self {
        Self {
            code,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<S: Symbol> fmt::Display for SymbolName<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match S::from_code(self.code) {
            Some(symbol) => f.write_str(symbol.name()),
            None => write!(f, "{}", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_match_wire_codes() {
        let severities: Vec<_> = Severity::ALL.iter().map(|s| (s.name(), s.code())).collect();
        assert_eq!(
            severities,
            vec![
                ("trace", 0),
                ("debug", 1),
                ("info", 2),
                ("warn", 3),
                ("notice", 4),
                ("error", 5),
                ("crit", 6),
                ("alert", 7),
            ]
        );

        let channels: Vec<_> = Channel::ALL.iter().map(|c| (c.name(), c.code())).collect();
        assert_eq!(
            channels,
            vec![
                ("net", 0),
                ("io", 1),
                ("auth", 2),
                ("sns", 3),
                ("cfg", 4),
                ("pwr", 5),
                ("app", 6),
                ("db", 7),
                ("ui", 8),
            ]
        );
    }

    #[test]
    fn test_name_round_trip() {
        for severity in Severity::ALL {
            assert_eq!(Severity::from_name(severity.name()), Some(*severity));
            assert_eq!(Severity::from_code(u64::from(severity.code())), Some(*severity));
        }
        for channel in Channel::ALL {
            assert_eq!(Channel::from_name(channel.name()), Some(*channel));
        }
    }

    #[test]
    fn test_token_resolution() {
        assert_eq!(Token::from("warn").resolve::<Severity>(), 3);
        assert_eq!(Token::from("WARN").resolve::<Severity>(), 3);
        assert_eq!(Token::from("sns").resolve::<Channel>(), 3);
        assert_eq!(Token::from(Channel::Ui).resolve::<Channel>(), 8);
        assert_eq!(Token::from(5u64).resolve::<Severity>(), 5);
    }

    #[test]
    fn test_unknown_token_falls_back() {
        assert_eq!(Token::from("6").resolve::<Severity>(), 6);
        assert_eq!(Token::from("42").resolve::<Channel>(), 42);
        assert_eq!(Token::from("bogus").resolve::<Severity>(), 0);
        assert_eq!(Token::from("").resolve::<Channel>(), 0);
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("notice".parse::<Severity>().unwrap(), Severity::Notice);
        assert_eq!("7".parse::<Severity>().unwrap(), Severity::Alert);
        assert_eq!("db".parse::<Channel>().unwrap(), Channel::Db);
        assert!(matches!(
            "loud".parse::<Severity>(),
            Err(CodecError::UnknownSymbol(_))
        ));
        assert!("9".parse::<Channel>().is_err());
    }

    #[test]
    fn test_symbol_name_display() {
        assert_eq!(SymbolName::<Severity>::new(3).to_string(), "warn");
        assert_eq!(SymbolName::<Channel>::new(8).to_string(), "ui");
        assert_eq!(SymbolName::<Severity>::new(12).to_string(), "12");
        assert_eq!(SymbolName::<Channel>::new(9).to_string(), "9");
    }

    #[test]
    fn test_token_deserialize() {
        let code: Token = serde_json::from_str("4").unwrap();
        let name: Token = serde_json::from_str("\"cfg\"").unwrap();
        assert_eq!(code, Token::Code(4));
        assert_eq!(name, Token::Name("cfg".to_string()));
    }
}
