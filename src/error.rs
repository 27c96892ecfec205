//! Error types for certificate inspection.
//!
//! Every failure is terminal for the command line tool: the binary prints the
//! message to standard error and exits non-zero. The variants only exist so
//! that library callers and tests can tell the failure classes apart.

use std::io;
use thiserror::Error;

/// Error type for a single inspection run.
#[derive(Debug, Error)]
pub enum InspectError {
    /// No target address was given
    #[error("please provide an -address to connect to")]
    MissingAddress,

    /// Invalid input provided on the command line
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput {
        /// Which flag was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },

    /// DNS resolution failed for the given hostname
    #[error("Failed to resolve hostname {hostname}: {source}")]
    DnsResolution {
        /// The hostname that failed to resolve
        hostname: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// TCP connection failed to the target address
    #[error("Connection failed to {address}: {source}")]
    ConnectionFailed {
        /// The address (host:port) that connection failed to
        address: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// TLS handshake failed
    #[error("TLS handshake failed: {details}")]
    HandshakeFailed {
        /// Details about why the handshake failed
        details: String,
    },

    /// OpenSSL context setup failed
    #[error("OpenSSL error: {details}")]
    OpenSSL {
        /// The underlying OpenSSL error
        details: String,
    },

    /// The handshake completed but the peer sent no certificates
    #[error("peer presented no certificates")]
    EmptyChain,

    /// A presented certificate could not be decoded
    #[error("Certificate error: {reason}")]
    CertificateDecode {
        /// Description of what went wrong
        reason: String,
    },

    /// Structured output could not be encoded
    #[error("failed to encode response as json: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the report failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<openssl::error::ErrorStack> for InspectError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSSL {
            details: e.to_string(),
        }
    }
}

impl<S: std::fmt::Debug> From<openssl::ssl::HandshakeError<S>> for InspectError {
    fn from(e: openssl::ssl::HandshakeError<S>) -> Self {
        Self::HandshakeFailed {
            details: e.to_string(),
        }
    }
}
