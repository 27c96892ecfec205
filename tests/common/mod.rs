//! Test certificates and a one-shot local TLS server.

#![allow(dead_code)]

use std::io::Read;
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::ssl::{SslAcceptor, SslMethod};
use openssl::x509::extension::{BasicConstraints, SubjectAlternativeName};
use openssl::x509::{X509Builder, X509Extension, X509Name, X509NameBuilder, X509};

pub struct Issued {
    pub cert: X509,
    pub key: PKey<Private>,
}

/// Describes one certificate to generate.
pub struct CertParams<'a> {
    pub common_name: &'a str,
    pub organization: &'a [&'a str],
    pub ca: bool,
    pub sans: &'a [&'a str],
    pub ocsp: &'a [&'a str],
    pub ca_issuers: &'a [&'a str],
    /// Unix timestamps
    pub not_before: i64,
    pub not_after: i64,
    pub serial: u32,
}

impl<'a> CertParams<'a> {
    pub fn new(common_name: &'a str) -> Self {
        let now = now_unix();
        CertParams {
            common_name,
            organization: &[],
            ca: false,
            sans: &[],
            ocsp: &[],
            ca_issuers: &[],
            not_before: now - 86_400,
            not_after: now + 90 * 86_400,
            serial: 1,
        }
    }
}

pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

fn new_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

fn name(params: &CertParams<'_>) -> X509Name {
    let mut builder = X509NameBuilder::new().unwrap();
    builder.append_entry_by_nid(Nid::COUNTRYNAME, "US").unwrap();
    for org in params.organization {
        builder
            .append_entry_by_nid(Nid::ORGANIZATIONNAME, org)
            .unwrap();
    }
    builder
        .append_entry_by_nid(Nid::COMMONNAME, params.common_name)
        .unwrap();
    builder.build()
}

/// Issues a certificate signed by `issuer`, or self-signed when `None`.
#[allow(deprecated)]
pub fn issue(params: &CertParams<'_>, issuer: Option<&Issued>) -> Issued {
    let key = new_key();
    let subject = name(params);

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(params.serial).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&subject).unwrap();
    match issuer {
        Some(issuer) => builder.set_issuer_name(issuer.cert.subject_name()).unwrap(),
        None => builder.set_issuer_name(&subject).unwrap(),
    }
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::from_unix(params.not_before).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(params.not_after).unwrap())
        .unwrap();

    if params.ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
    }

    if !params.sans.is_empty() {
        let mut san = SubjectAlternativeName::new();
        for dns in params.sans {
            san.dns(dns);
        }
        let ext = san
            .build(&builder.x509v3_context(issuer.map(|i| &*i.cert), None))
            .unwrap();
        builder.append_extension(ext).unwrap();
    }

    let access: Vec<String> = params
        .ocsp
        .iter()
        .map(|uri| format!("OCSP;URI:{}", uri))
        .chain(params.ca_issuers.iter().map(|uri| format!("caIssuers;URI:{}", uri)))
        .collect();
    if !access.is_empty() {
        let ext = X509Extension::new(
            None,
            Some(&builder.x509v3_context(issuer.map(|i| &*i.cert), None)),
            "authorityInfoAccess",
            &access.join(","),
        )
        .unwrap();
        builder.append_extension(ext).unwrap();
    }

    let signing_key = issuer.map(|i| &i.key).unwrap_or(&key);
    builder.sign(signing_key, MessageDigest::sha256()).unwrap();

    Issued {
        cert: builder.build(),
        key,
    }
}

/// Root, intermediate and leaf, leaf first.
pub fn sample_chain() -> Vec<Issued> {
    let root = issue(
        &CertParams {
            organization: &["Example Trust"],
            ca: true,
            serial: 10,
            ..CertParams::new("Example Root CA")
        },
        None,
    );
    let intermediate = issue(
        &CertParams {
            organization: &["Example Trust"],
            ca: true,
            ca_issuers: &["http://ca.example.test/root.crt"],
            serial: 20,
            ..CertParams::new("Example Issuing CA")
        },
        Some(&root),
    );
    let leaf = issue(
        &CertParams {
            sans: &["z.example.test", "a.example.test", "m.example.test"],
            ocsp: &["http://ocsp.example.test"],
            ca_issuers: &["http://ca.example.test/issuing.crt"],
            serial: 30,
            ..CertParams::new("a.example.test")
        },
        Some(&intermediate),
    );
    vec![leaf, intermediate, root]
}

/// Serves `chain` (leaf first) for a single TLS connection on 127.0.0.1.
pub fn serve_once(chain: &[Issued]) -> (SocketAddr, JoinHandle<()>) {
    let mut builder = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).unwrap();
    builder.set_private_key(&chain[0].key).unwrap();
    builder.set_certificate(&chain[0].cert).unwrap();
    for extra in &chain[1..] {
        builder.add_extra_chain_cert(extra.cert.clone()).unwrap();
    }
    builder.check_private_key().unwrap();
    let acceptor = builder.build();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            if let Ok(mut tls) = acceptor.accept(stream) {
                let mut buf = [0u8; 64];
                let _ = tls.read(&mut buf);
            }
        }
    });
    (addr, handle)
}
