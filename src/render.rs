//! Writers for the certificate report.

use std::io::Write;

use chrono::{DateTime, Utc};
use log::info;

use crate::certificate::PeerCertificate;
use crate::config::{ChainScope, InspectConfig, Layout};
use crate::error::InspectError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Writes the presented chain according to `config`.
///
/// Certificates are decoded one at a time, so a malformed certificate further
/// down the chain does not affect a leaf-only report.
pub fn write_chain<W: Write>(
    config: &InspectConfig,
    chain: &[Vec<u8>],
    now: DateTime<Utc>,
    out: &mut W,
) -> Result<(), InspectError> {
    if config.emits_structured()
        && config.scope == ChainScope::FullChain
        && config.stops_after_record()
        && chain.len() > 1
    {
        info!(
            "structured output prints only the first of {} certificates; pass -json-chain for all of them",
            chain.len()
        );
    }

    for (index, der) in chain.iter().enumerate() {
        let cert = PeerCertificate::from_der(der)?;
        if config.emits_structured() {
            write_structured(out, &cert)?;
        } else {
            write_plain(out, index, &cert, config.layout, now)?;
        }
        if config.stops_after_record() {
            break;
        }
    }
    Ok(())
}

/// Writes one compact JSON record followed by a newline.
pub fn write_structured<W: Write>(out: &mut W, cert: &PeerCertificate) -> Result<(), InspectError> {
    serde_json::to_writer(&mut *out, &cert.to_record())?;
    writeln!(out)?;
    Ok(())
}

/// Writes the labelled plain-text record for the certificate at `index`.
pub fn write_plain<W: Write>(
    out: &mut W,
    index: usize,
    cert: &PeerCertificate,
    layout: Layout,
    now: DateTime<Utc>,
) -> Result<(), InspectError> {
    writeln!(out, "\n--- Certificate {} ({}) ---", index + 1, cert.kind())?;

    let sans = cert.sorted_dns_names();
    match layout {
        Layout::Full => {
            writeln!(out, "Fingerprint:\t{}", cert.fingerprint())?;
            writeln!(out, "Subject:\t{}", cert.subject.rendered)?;
            writeln!(out, "Issuer:\t\t{}", cert.issuer.rendered)?;
            if !sans.is_empty() {
                write_sans(out, &sans)?;
            }
        }
        Layout::Minimal => {
            writeln!(out, "Common Name:\t{}", cert.common_name())?;
            writeln!(out, "Issuer:\t\t{}", cert.issuer_organization())?;
            write_sans(out, &sans)?;
        }
    }

    writeln!(out, "Start Date:\t{}", cert.not_before.format(DATE_FORMAT))?;
    writeln!(out, "End Date:\t{}", cert.not_after.format(DATE_FORMAT))?;
    writeln!(out, "Remaining Days:\t{}", cert.remaining_days(now))?;

    if layout == Layout::Full && has_access_section(cert) {
        // RFC 5280, 4.2.2.1
        writeln!(out)?;
        writeln!(out, "X509v3 Extension - Authority Information Access")?;
        writeln!(out, "OCSP Server: {}", cert.ocsp_server.join(", "))?;
        writeln!(
            out,
            "Issuing Certificate URL: {}",
            cert.issuing_certificate_url.join(", ")
        )?;
    }
    Ok(())
}

fn write_sans<W: Write>(out: &mut W, sans: &[String]) -> Result<(), InspectError> {
    writeln!(out, "Subject Alternative Names:")?;
    for san in sans {
        writeln!(out, "\t{}", san)?;
    }
    Ok(())
}

/// More than one OCSP responder or any issuer URL.
pub fn has_access_section(cert: &PeerCertificate) -> bool {
    cert.ocsp_server.len() > 1 || !cert.issuing_certificate_url.is_empty()
}
