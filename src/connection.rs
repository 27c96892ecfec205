//! The single outbound TLS connection.
//!
//! Peer verification is switched off on purpose: the tool reports on whatever
//! the server presents, including expired, self-signed or mismatched
//! certificates. Nothing returned from here has been checked for trust.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use log::debug;
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};

use crate::config::InspectConfig;
use crate::error::InspectError;

/// What the peer presented during one handshake.
#[derive(Debug, Clone)]
pub struct PeerChain {
    /// DER certificates in the order sent, leaf first
    pub certificates: Vec<Vec<u8>>,
    pub peer_addr: SocketAddr,
    pub protocol: String,
    pub cipher: Option<String>,
}

/// Connects to the configured target, completes a handshake and returns the
/// peer certificate chain. The connection is closed before returning.
///
/// # Errors
///
/// * `InspectError::DnsResolution` - the connect host did not resolve
/// * `InspectError::ConnectionFailed` - no resolved address accepted the connection
/// * `InspectError::HandshakeFailed` - the TLS handshake failed
/// * `InspectError::EmptyChain` - the handshake completed without certificates
pub fn fetch_peer_chain(config: &InspectConfig) -> Result<PeerChain, InspectError> {
    let target = config.connect_target();
    let addrs = resolve(&target, &config.connect_host)?;
    debug!("resolved {} to {:?}", target, addrs);

    let tcp_stream =
        TcpStream::connect(&addrs[..]).map_err(|e| InspectError::ConnectionFailed {
            address: target.clone(),
            source: e,
        })?;
    let peer_addr = tcp_stream
        .peer_addr()
        .map_err(|e| InspectError::ConnectionFailed {
            address: target.clone(),
            source: e,
        })?;

    let mut context = SslConnector::builder(SslMethod::tls())?;
    context.set_verify(SslVerifyMode::NONE);
    let connector = context.build();

    let mut connect_config = connector.configure()?;
    connect_config.set_verify_hostname(false);
    connect_config.set_use_server_name_indication(true);

    debug!("handshake with {} using SNI {:?}", peer_addr, config.server_name());
    let mut stream = connect_config.connect(config.server_name(), tcp_stream)?;

    let ssl = stream.ssl();
    let protocol = ssl.version_str().to_string();
    let cipher = ssl.current_cipher().map(|c| c.name().to_string());
    debug!("negotiated {} with cipher {:?}", protocol, cipher);

    // On the client side the chain includes the leaf.
    let certificates = match ssl.peer_cert_chain() {
        Some(chain) => chain
            .iter()
            .map(|cert| cert.to_der())
            .collect::<Result<Vec<_>, _>>()?,
        None => match ssl.peer_certificate() {
            Some(leaf) => vec![leaf.to_der()?],
            None => Vec::new(),
        },
    };
    debug!("peer presented {} certificate(s)", certificates.len());

    if let Err(e) = stream.shutdown() {
        debug!("TLS shutdown with {} failed: {}", peer_addr, e);
    }

    if certificates.is_empty() {
        return Err(InspectError::EmptyChain);
    }

    Ok(PeerChain {
        certificates,
        peer_addr,
        protocol,
        cipher,
    })
}

fn resolve(target: &str, hostname: &str) -> Result<Vec<SocketAddr>, InspectError> {
    let addrs: Vec<SocketAddr> = target
        .to_socket_addrs()
        .map_err(|e| InspectError::DnsResolution {
            hostname: hostname.to_string(),
            source: e,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(InspectError::DnsResolution {
            hostname: hostname.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"),
        });
    }
    Ok(addrs)
}
