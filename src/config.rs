//! Inspection settings.
//!
//! The parsed command line is turned into an [`InspectConfig`] exactly once at
//! startup. The struct is read-only afterwards and is handed by reference to
//! the connection and rendering code.
//!
//! # Target resolution
//!
//! 1. The SNI name is `-sni` when given, otherwise the address as typed.
//! 2. `-akamai-staging` appends [`STAGING_SUFFIX`] to the connect host. The SNI
//!    default above is taken *before* the suffix is applied.
//! 3. `-ip` replaces the connect host entirely; the SNI name is unchanged.
//! 4. The connect target is `host:port`, with IPv6 literals bracketed.

use std::net::IpAddr;

use clap::ValueEnum;
use strum_macros::Display;

use crate::cli::Args;
use crate::error::InspectError;

/// Suffix that routes a hostname through the Akamai staging edge network.
pub const STAGING_SUFFIX: &str = ".edgekey-staging.net";

/// How each certificate is written to standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OutputMode {
    /// Labelled plain-text fields
    #[strum(serialize = "plain")]
    Plain,
    /// One JSON object per line
    #[strum(serialize = "json")]
    Structured,
}

/// How far down the presented chain to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChainScope {
    #[strum(serialize = "leaf")]
    LeafOnly,
    #[strum(serialize = "chain")]
    FullChain,
}

/// Which plain-text fields are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, ValueEnum)]
pub enum Layout {
    /// Fingerprint, Subject, Issuer, SANs (when present), validity and AIA
    #[strum(serialize = "full")]
    Full,
    /// Common Name, issuer organisation, SANs (always), validity
    #[strum(serialize = "minimal")]
    Minimal,
}

/// Immutable settings for one inspection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectConfig {
    /// Address as given on the command line, without the staging suffix
    pub address: String,
    /// Host the TCP connection is opened to
    pub connect_host: String,
    pub port: u16,
    /// Name sent in the TLS ServerName extension
    pub sni: String,
    pub output: OutputMode,
    pub scope: ChainScope,
    pub layout: Layout,
    /// In structured mode, honour [`ChainScope::FullChain`] instead of
    /// stopping after the first record
    pub structured_chain: bool,
}

impl InspectConfig {
    /// Builds the configuration from parsed command-line arguments.
    ///
    /// # Errors
    ///
    /// * `InspectError::MissingAddress` - no `-address`/`-domain` or an empty one
    /// * `InspectError::InvalidInput` - `-port` is not a port number or `-ip`
    ///   is not an IP address
    ///
    /// No network I/O happens here.
    pub fn from_args(args: &Args) -> Result<Self, InspectError> {
        let address = match args.address.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => address.to_string(),
            _ => return Err(InspectError::MissingAddress),
        };

        let port = parse_port(&args.port)?;

        let sni = match args.sni.as_deref() {
            Some(sni) if !sni.is_empty() => sni.to_string(),
            _ => address.clone(),
        };

        let connect_host = match args.ip.as_deref() {
            Some(ip) => ip
                .parse::<IpAddr>()
                .map_err(|e| InspectError::InvalidInput {
                    field: "ip".to_string(),
                    reason: e.to_string(),
                })?
                .to_string(),
            None if args.akamai_staging => format!("{}{}", address, STAGING_SUFFIX),
            None => address.clone(),
        };

        Ok(InspectConfig {
            address,
            connect_host,
            port,
            sni,
            output: if args.json {
                OutputMode::Structured
            } else {
                OutputMode::Plain
            },
            scope: if args.chain {
                ChainScope::FullChain
            } else {
                ChainScope::LeafOnly
            },
            layout: args.layout,
            structured_chain: args.json_chain,
        })
    }

    /// Returns the `host:port` string the TCP connection is opened to.
    pub fn connect_target(&self) -> String {
        match self.connect_host.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            _ => format!("{}:{}", self.connect_host, self.port),
        }
    }

    /// Returns the name presented in the handshake.
    pub fn server_name(&self) -> &str {
        &self.sni
    }

    /// Whether the chain is written as JSON records.
    pub fn emits_structured(&self) -> bool {
        self.output == OutputMode::Structured
    }

    /// Whether printing stops once the current record has been written.
    ///
    /// Leaf-only scope always stops after the first record. Structured output
    /// stops after the first record too unless `structured_chain` is set.
    pub fn stops_after_record(&self) -> bool {
        !self.continues_down_chain()
    }

    fn continues_down_chain(&self) -> bool {
        match (self.scope, self.output) {
            (ChainScope::LeafOnly, _) => false,
            (ChainScope::FullChain, OutputMode::Plain) => true,
            (ChainScope::FullChain, OutputMode::Structured) => self.structured_chain,
        }
    }
}

fn parse_port(port: &str) -> Result<u16, InspectError> {
    port.parse::<u16>().map_err(|e| InspectError::InvalidInput {
        field: "port".to_string(),
        reason: format!("{:?} is not a valid port: {}", port, e),
    })
}
