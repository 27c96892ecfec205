//! Connects to a TLS endpoint and reports on the certificates it presents.
//!
//! The handshake runs with peer verification disabled so that expired,
//! self-signed and otherwise invalid certificates can still be inspected.
//! This is a reporting tool; it does not evaluate trust.
//!
//! ```no_run
//! use certpeek::cli::Args;
//! use certpeek::config::InspectConfig;
//! use clap::Parser;
//!
//! let args = Args::parse_from(["certpeek", "--address", "example.com", "--chain"]);
//! let config = InspectConfig::from_args(&args)?;
//! certpeek::inspect(&config, &mut std::io::stdout())?;
//! # Ok::<(), certpeek::InspectError>(())
//! ```

pub mod certificate;
pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod render;

use std::io::Write;

use chrono::Utc;
use log::debug;

pub use certificate::{CertificateKind, PeerCertificate};
pub use config::InspectConfig;
pub use error::InspectError;

/// Opens one connection to the configured target and writes the report.
///
/// The connection is closed before anything is written. Errors are returned
/// as-is; nothing is retried.
pub fn inspect<W: Write>(config: &InspectConfig, out: &mut W) -> Result<(), InspectError> {
    debug!(
        "inspecting {} (sni {}, output {}, scope {}, layout {})",
        config.connect_target(),
        config.server_name(),
        config.output,
        config.scope,
        config.layout
    );
    let chain = connection::fetch_peer_chain(config)?;
    render::write_chain(config, &chain.certificates, Utc::now(), out)?;
    out.flush()?;
    Ok(())
}
