//! Command-line surface.
//!
//! Long flags are accepted both in the GNU form (`--address example.com`) and
//! in the single-dash form (`-address example.com`, `-port=8443`) that earlier
//! releases of the tool documented. [`normalize_args`] rewrites the latter
//! before clap sees them.

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::config::Layout;

/// Long flags that may be written with a single leading dash.
const LONG_FLAGS: &[&str] = &[
    "address",
    "domain",
    "ip",
    "port",
    "sni",
    "akamai-staging",
    "chain",
    "json",
    "json-chain",
    "layout",
    "log-level",
    "help",
    "version",
];

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "certpeek", version, about, long_about = None)]
pub struct Args {
    /// Address to connect to. Can be a hostname or IP address.
    #[arg(long, visible_alias = "domain")]
    pub address: Option<String>,

    /// Connect to this IP instead of resolving -address (SNI is unchanged)
    #[arg(long)]
    pub ip: Option<String>,

    /// Override port to connect to
    #[arg(long, default_value = "443")]
    pub port: String,

    /// Override SNI domain (default matches -address)
    #[arg(long)]
    pub sni: Option<String>,

    /// Resolve -address using Akamai's staging environment
    #[arg(long = "akamai-staging")]
    pub akamai_staging: bool,

    /// Print entire cert chain, rather than only the leaf node
    #[arg(long)]
    pub chain: bool,

    /// Print all cert information as JSON
    #[arg(long)]
    pub json: bool,

    /// With -json and -chain, print one JSON record per certificate
    #[arg(long = "json-chain")]
    pub json_chain: bool,

    /// Plain-text field layout
    #[arg(long, value_enum, default_value_t = Layout::Full)]
    pub layout: Layout,

    /// Diagnostic log level written to stderr
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Rewrites single-dash long flags into their double-dash form.
///
/// The first item is the program name and is passed through untouched, as is
/// everything after a bare `--`. Unknown single-dash words are left alone so
/// clap can report them.
pub fn normalize_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            match arg.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if LONG_FLAGS.contains(&name) {
                        format!("-{}", arg)
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

impl Args {
    /// Parses the process arguments, accepting both flag styles.
    pub fn parse_normalized() -> Self {
        Args::parse_from(normalize_args(std::env::args()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(normalize_args(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_single_dash_flags_are_rewritten() {
        let args = normalize_args(["certpeek", "-address", "example.com", "-port=8443", "-chain"]);
        assert_eq!(
            args,
            vec!["certpeek", "--address", "example.com", "--port=8443", "--chain"]
        );
    }

    #[test]
    fn test_unknown_and_short_flags_untouched() {
        let args = normalize_args(["certpeek", "-x", "-bogus", "--json", "--", "-chain"]);
        assert_eq!(args, vec!["certpeek", "-x", "-bogus", "--json", "--", "-chain"]);
    }

    #[test]
    fn test_program_name_untouched() {
        let args = normalize_args(["-chain"]);
        assert_eq!(args, vec!["-chain"]);
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["certpeek", "-address", "example.com"]);
        assert_eq!(args.address.as_deref(), Some("example.com"));
        assert_eq!(args.port, "443");
        assert_eq!(args.sni, None);
        assert_eq!(args.ip, None);
        assert!(!args.akamai_staging);
        assert!(!args.chain);
        assert!(!args.json);
        assert!(!args.json_chain);
        assert_eq!(args.layout, Layout::Full);
        assert_eq!(args.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_domain_alias() {
        let args = parse(&["certpeek", "-domain", "example.org"]);
        assert_eq!(args.address.as_deref(), Some("example.org"));
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "certpeek",
            "-address=example.com",
            "-ip",
            "192.0.2.10",
            "-port",
            "8443",
            "-sni",
            "www.example.com",
            "-akamai-staging",
            "-chain",
            "-json",
            "-json-chain",
            "-layout",
            "minimal",
            "-log-level",
            "debug",
        ]);
        assert_eq!(args.address.as_deref(), Some("example.com"));
        assert_eq!(args.ip.as_deref(), Some("192.0.2.10"));
        assert_eq!(args.port, "8443");
        assert_eq!(args.sni.as_deref(), Some("www.example.com"));
        assert!(args.akamai_staging);
        assert!(args.chain);
        assert!(args.json);
        assert!(args.json_chain);
        assert_eq!(args.layout, Layout::Minimal);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_address_is_not_a_parse_error() {
        let args = parse(&["certpeek"]);
        assert_eq!(args.address, None);
    }
}
