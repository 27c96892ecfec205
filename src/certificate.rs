//! Decoded view of one certificate presented by the peer.
//!
//! Parsing is delegated to `x509-parser`; this module only copies out the
//! fields the report prints and derives the few computed values (kind,
//! fingerprint, remaining days). Nothing here validates trust.

use std::fmt::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use strum_macros::Display;
use x509_parser::extensions::{DistributionPointName, GeneralName, ParsedExtension};
use x509_parser::prelude::*;

use crate::error::InspectError;

/// `id-ad-ocsp` access method (RFC 5280, 4.2.2.1)
const OID_AD_OCSP: &str = "1.3.6.1.5.5.7.48.1";
/// `id-ad-caIssuers` access method (RFC 5280, 4.2.2.1)
const OID_AD_CA_ISSUERS: &str = "1.3.6.1.5.5.7.48.2";

/// Position of a certificate in the presented chain, as far as the report
/// can tell without validating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum CertificateKind {
    Root,
    Intermediate,
    Leaf,
}

impl CertificateKind {
    /// A self-signed certificate is a root even without the CA flag.
    pub fn classify(self_signed: bool, is_ca: bool) -> Self {
        if self_signed {
            CertificateKind::Root
        } else if is_ca {
            CertificateKind::Intermediate
        } else {
            CertificateKind::Leaf
        }
    }
}

/// Subject or issuer distinguished name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistinguishedName {
    /// Library string form, e.g. `C=US, O=Example, CN=example.com`
    pub rendered: String,
    pub common_name: Vec<String>,
    pub organization: Vec<String>,
    pub organization_unit: Vec<String>,
    pub country_or_region: Vec<String>,
    pub state_or_province: Vec<String>,
    pub locality: Vec<String>,
}

impl DistinguishedName {
    fn from_x509(name: &X509Name<'_>) -> Self {
        fn values<'n, 'a: 'n>(
            iter: impl Iterator<Item = &'n AttributeTypeAndValue<'a>>,
        ) -> Vec<String> {
            iter.filter_map(|attr| attr.as_str().ok())
                .map(String::from)
                .collect()
        }

        DistinguishedName {
            rendered: name.to_string(),
            common_name: values(name.iter_common_name()),
            organization: values(name.iter_organization()),
            organization_unit: values(name.iter_organizational_unit()),
            country_or_region: values(name.iter_country()),
            state_or_province: values(name.iter_state_or_province()),
            locality: values(name.iter_locality()),
        }
    }
}

/// One certificate from the peer chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCertificate {
    /// DER encoding as received
    pub raw: Vec<u8>,
    pub raw_subject: Vec<u8>,
    pub raw_issuer: Vec<u8>,
    pub subject: DistinguishedName,
    pub issuer: DistinguishedName,
    pub version: u32,
    pub serial_number: String,
    pub signature_algorithm: String,
    pub public_key_algorithm: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub is_ca: bool,
    /// DNS subject alternative names in certificate order
    pub dns_names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub ip_addresses: Vec<String>,
    pub uris: Vec<String>,
    pub ocsp_server: Vec<String>,
    pub issuing_certificate_url: Vec<String>,
    pub crl_distribution_points: Vec<String>,
}

impl PeerCertificate {
    /// Decodes a DER certificate.
    ///
    /// # Errors
    ///
    /// `InspectError::CertificateDecode` when the bytes are not a certificate
    /// or a validity time is outside the representable range.
    pub fn from_der(der: &[u8]) -> Result<Self, InspectError> {
        let (_, cert) = X509Certificate::from_der(der).map_err(|e| {
            InspectError::CertificateDecode {
                reason: e.to_string(),
            }
        })?;

        let mut decoded = PeerCertificate {
            raw: der.to_vec(),
            raw_subject: cert.subject().as_raw().to_vec(),
            raw_issuer: cert.issuer().as_raw().to_vec(),
            subject: DistinguishedName::from_x509(cert.subject()),
            issuer: DistinguishedName::from_x509(cert.issuer()),
            version: cert.version().0 + 1,
            serial_number: colon_hex(cert.raw_serial()),
            signature_algorithm: cert.signature_algorithm.algorithm.to_id_string(),
            public_key_algorithm: cert.public_key().algorithm.algorithm.to_id_string(),
            not_before: to_utc(cert.validity().not_before.timestamp())?,
            not_after: to_utc(cert.validity().not_after.timestamp())?,
            is_ca: cert.is_ca(),
            dns_names: Vec::new(),
            email_addresses: Vec::new(),
            ip_addresses: Vec::new(),
            uris: Vec::new(),
            ocsp_server: Vec::new(),
            issuing_certificate_url: Vec::new(),
            crl_distribution_points: Vec::new(),
        };

        for extension in cert.extensions() {
            match extension.parsed_extension() {
                ParsedExtension::SubjectAlternativeName(san) => {
                    for name in &san.general_names {
                        decoded.push_alternative_name(name);
                    }
                }
                ParsedExtension::AuthorityInfoAccess(aia) => {
                    for desc in &aia.accessdescs {
                        let GeneralName::URI(uri) = &desc.access_location else {
                            continue;
                        };
                        match desc.access_method.to_id_string().as_str() {
                            OID_AD_OCSP => decoded.ocsp_server.push(uri.to_string()),
                            OID_AD_CA_ISSUERS => {
                                decoded.issuing_certificate_url.push(uri.to_string())
                            }
                            _ => {}
                        }
                    }
                }
                ParsedExtension::CRLDistributionPoints(points) => {
                    for point in points.iter() {
                        if let Some(DistributionPointName::FullName(names)) =
                            &point.distribution_point
                        {
                            decoded.crl_distribution_points.extend(
                                names.iter().filter_map(|name| match name {
                                    GeneralName::URI(uri) => Some(uri.to_string()),
                                    _ => None,
                                }),
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(decoded)
    }

    fn push_alternative_name(&mut self, name: &GeneralName<'_>) {
        match name {
            GeneralName::DNSName(dns) => self.dns_names.push(dns.to_string()),
            GeneralName::RFC822Name(email) => self.email_addresses.push(email.to_string()),
            GeneralName::URI(uri) => self.uris.push(uri.to_string()),
            GeneralName::IPAddress(bytes) => {
                if let Some(ip) = ip_from_bytes(bytes) {
                    self.ip_addresses.push(ip.to_string());
                }
            }
            _ => {}
        }
    }

    /// Issuer and subject are encoded identically.
    pub fn is_self_signed(&self) -> bool {
        self.raw_subject == self.raw_issuer
    }

    pub fn kind(&self) -> CertificateKind {
        CertificateKind::classify(self.is_self_signed(), self.is_ca)
    }

    /// SHA-1 over the DER bytes, as `SHA1=AB:CD:...`.
    pub fn fingerprint(&self) -> String {
        format!("SHA1={}", colon_hex(&openssl::sha::sha1(&self.raw)))
    }

    /// DNS alternative names in ascending byte order.
    pub fn sorted_dns_names(&self) -> Vec<String> {
        let mut names = self.dns_names.clone();
        names.sort();
        names
    }

    /// Whole days until `not_after`, truncated toward zero.
    pub fn remaining_days(&self, now: DateTime<Utc>) -> i64 {
        days_between(now, self.not_after)
    }

    /// First subject common name, or an empty string.
    pub fn common_name(&self) -> &str {
        self.subject
            .common_name
            .first()
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Issuer organisation values joined with `, `.
    pub fn issuer_organization(&self) -> String {
        self.issuer.organization.join(", ")
    }

    pub fn to_record(&self) -> CertificateRecord {
        CertificateRecord {
            raw: openssl::base64::encode_block(&self.raw),
            fingerprint_sha1: self.fingerprint(),
            kind: self.kind(),
            version: self.version,
            serial_number: self.serial_number.clone(),
            signature_algorithm: self.signature_algorithm.clone(),
            public_key_algorithm: self.public_key_algorithm.clone(),
            subject: self.subject.clone(),
            issuer: self.issuer.clone(),
            not_before: self.not_before.to_rfc3339_opts(SecondsFormat::Secs, true),
            not_after: self.not_after.to_rfc3339_opts(SecondsFormat::Secs, true),
            is_ca: self.is_ca,
            dns_names: self.dns_names.clone(),
            email_addresses: self.email_addresses.clone(),
            ip_addresses: self.ip_addresses.clone(),
            uris: self.uris.clone(),
            ocsp_server: self.ocsp_server.clone(),
            issuing_certificate_url: self.issuing_certificate_url.clone(),
            crl_distribution_points: self.crl_distribution_points.clone(),
        }
    }
}

/// Structured form of a [`PeerCertificate`], written one per line.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateRecord {
    /// Base64 DER
    pub raw: String,
    pub fingerprint_sha1: String,
    pub kind: CertificateKind,
    pub version: u32,
    pub serial_number: String,
    pub signature_algorithm: String,
    pub public_key_algorithm: String,
    pub subject: DistinguishedName,
    pub issuer: DistinguishedName,
    pub not_before: String,
    pub not_after: String,
    pub is_ca: bool,
    pub dns_names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub ip_addresses: Vec<String>,
    pub uris: Vec<String>,
    pub ocsp_server: Vec<String>,
    pub issuing_certificate_url: Vec<String>,
    pub crl_distribution_points: Vec<String>,
}

/// Whole days from `now` to `until`: hours first, then divided by 24, both
/// truncating toward zero. Negative once `until` has passed.
pub fn days_between(now: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    (until - now).num_hours() / 24
}

/// Uppercase hex byte pairs joined by `:`.
pub fn colon_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        let _ = write!(out, "{:02X}", b);
    }
    out
}

fn to_utc(timestamp: i64) -> Result<DateTime<Utc>, InspectError> {
    DateTime::from_timestamp(timestamp, 0).ok_or_else(|| InspectError::CertificateDecode {
        reason: format!("validity timestamp {} out of range", timestamp),
    })
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => Some(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]).into()),
        16 => {
            let octets: [u8; 16] = bytes.try_into().ok()?;
            Some(Ipv6Addr::from(octets).into())
        }
        _ => None,
    }
}
