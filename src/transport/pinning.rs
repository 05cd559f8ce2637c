// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Certificate pinning during the TLS handshake
//!
//! A pinned host whose leaf certificate does not match aborts the handshake,
//! so nothing of the request (headers, cookies, body) reaches the peer.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::SystemTime;

use base64::Engine;
use rustls::client::{ServerCertVerified, ServerCertVerifier, WebPkiVerifier};
use rustls::{Certificate, ClientConfig, OwnedTrustAnchor, RootCertStore, ServerName};
use sha2::{Digest, Sha256};
use tracing::warn;
use url::Url;

use super::{BadPinHandler, CertificatePins, TransportSpec};

/// Pin string for a DER certificate: base64 of its SHA-256 digest
pub fn pin_for_certificate(der: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(Sha256::digest(der))
}

/// Verifier that checks pins first, then the usual webpki chain
pub(crate) struct PinningVerifier {
    pins: CertificatePins,
    bad_pin_handler: Option<BadPinHandler>,
    /// Skip the chain check, pins still apply
    skip_chain: bool,
    webpki: WebPkiVerifier,
}

impl PinningVerifier {
    pub(crate) fn new(
        pins: CertificatePins,
        bad_pin_handler: Option<BadPinHandler>,
        skip_chain: bool,
    ) -> Self {
        Self {
            pins,
            bad_pin_handler,
            skip_chain,
            webpki: WebPkiVerifier::new(webpki_roots(), None),
        }
    }

    fn check_pin(&self, host: &str, leaf: &Certificate) -> Result<(), rustls::Error> {
        let Some(pins) = self.pins.get(host) else {
            return Ok(());
        };

        let presented = pin_for_certificate(&leaf.0);
        if pins.iter().any(|p| p.trim_start_matches("sha256/") == presented) {
            return Ok(());
        }

        warn!(host, presented = %presented, "certificate pin mismatch");
        if let Some(ref handler) = self.bad_pin_handler {
            if let Ok(url) = Url::parse(&format!("https://{}/", url_host(host))) {
                handler(&url);
            }
        }
        Err(rustls::Error::General(format!(
            "certificate pin mismatch for {}",
            host
        )))
    }
}

impl ServerCertVerifier for PinningVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &Certificate,
        intermediates: &[Certificate],
        server_name: &ServerName,
        scts: &mut dyn Iterator<Item = &[u8]>,
        ocsp_response: &[u8],
        now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        if let Some(host) = host_of(server_name) {
            self.check_pin(&host, end_entity)?;
        }
        if self.skip_chain {
            return Ok(ServerCertVerified::assertion());
        }
        self.webpki.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            scts,
            ocsp_response,
            now,
        )
    }
}

/// rustls config carrying the pin verifier and the profile's ALPN list
pub(crate) fn pinned_tls_config(spec: &TransportSpec, http1_only: bool) -> ClientConfig {
    let verifier = PinningVerifier::new(
        spec.certificate_pins.clone(),
        spec.bad_pin_handler.clone(),
        spec.insecure_skip_verify,
    );
    let mut config = ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();

    config.alpn_protocols = if http1_only {
        vec![b"http/1.1".to_vec()]
    } else {
        spec.profile
            .alpn
            .iter()
            .map(|p| p.as_bytes().to_vec())
            .collect()
    };
    config
}

fn webpki_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            ta.subject,
            ta.spki,
            ta.name_constraints,
        )
    }));
    roots
}

fn host_of(server_name: &ServerName) -> Option<String> {
    match server_name {
        ServerName::DnsName(name) => Some(name.as_ref().to_string()),
        ServerName::IpAddress(ip) => Some(ip.to_string()),
        _ => None,
    }
}

fn url_host(host: &str) -> String {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => format!("[{}]", host),
        _ => host.to_string(),
    }
}
