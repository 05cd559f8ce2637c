// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! reqwest-backed transport

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use hyper::client::connect::dns::Name;
use parking_lot::RwLock;
use reqwest::dns::{Addrs, Resolve, Resolving};
use reqwest::header::{HeaderMap, ACCEPT_ENCODING, PROXY_AUTHORIZATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Proxy};
use tokio::net::lookup_host;
use tracing::{debug, warn};

use super::dialer::{ConnectDialer, Dialer};
use super::pinning::pinned_tls_config;
use super::{RoundTripper, TransportBuilder, TransportSpec};
use crate::error::{Error, Result};
use crate::http::{
    RawResponse, RedirectAttempt, RedirectControl, RedirectDecision, Request, RequestInfo,
    ResponseHead, TlsInfo,
};

/// Builds [`ReqwestRoundTripper`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransportBuilder;

impl TransportBuilder for ReqwestTransportBuilder {
    fn build(&self, spec: &TransportSpec) -> Result<Arc<dyn RoundTripper>> {
        let client = build_client(spec)?;
        debug!(
            profile = %spec.profile.name,
            proxied = spec.dialer.is_proxied(),
            "built reqwest transport"
        );
        Ok(Arc::new(ReqwestRoundTripper {
            client: RwLock::new(client),
            spec: spec.clone(),
        }))
    }
}

/// Round-tripper over a `reqwest::Client`
pub struct ReqwestRoundTripper {
    client: RwLock<Client>,
    spec: TransportSpec,
}

impl ReqwestRoundTripper {
    fn classify(&self, err: reqwest::Error, request: &Request) -> Error {
        if err.is_timeout() {
            let limit = request.timeout.unwrap_or(self.spec.timeout);
            return Error::timeout_with_url(
                "request",
                u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                request.url.as_str(),
            );
        }
        Error::Http(err)
    }
}

#[async_trait]
impl RoundTripper for ReqwestRoundTripper {
    async fn round_trip(&self, request: Request) -> Result<RawResponse> {
        let client = self.client.read().clone();
        let uncompressed = !self.spec.options.disable_compression
            && !request.headers.contains_key(ACCEPT_ENCODING);

        let mut builder = client
            .request(request.method.clone(), request.url.clone())
            .headers(request.ordered_headers());
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.classify(e, &request))?;

        let tls = response
            .extensions()
            .get::<reqwest::tls::TlsInfo>()
            .map(|info| TlsInfo {
                peer_certificate: info.peer_certificate().map(<[u8]>::to_vec),
            });

        let head = ResponseHead {
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
            content_length: response.content_length(),
            uncompressed,
            // reqwest 0.11 does not surface trailers
            trailer: HeaderMap::new(),
            request: RequestInfo {
                method: request.method,
                url: response.url().clone(),
                header_order: request.header_order,
            },
            tls,
        };
        let body = response
            .bytes_stream()
            .map_err(|e| Error::body_read(e.to_string()))
            .boxed();

        Ok(RawResponse { head, body })
    }

    fn close_idle_connections(&self) {
        // the old client's pool goes away once in-flight requests drop their clones
        match build_client(&self.spec) {
            Ok(fresh) => *self.client.write() = fresh,
            Err(e) => warn!(error = %e, "could not recycle connection pool"),
        }
    }
}

impl fmt::Debug for ReqwestRoundTripper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestRoundTripper")
            .field("spec", &self.spec)
            .finish()
    }
}

fn build_client(spec: &TransportSpec) -> Result<Client> {
    if let Some(ref name) = spec.server_name_override {
        return Err(Error::transport_build(format!(
            "server name override '{}' is not supported by the reqwest transport",
            name
        )));
    }
    if spec.disable_ipv4 && spec.disable_ipv6 {
        return Err(Error::transport_build("both IPv4 and IPv6 are disabled"));
    }
    if spec.random_extension_order {
        debug!(profile = %spec.profile.name, "extension order is left to the TLS backend");
    }

    let direct = spec.dialer.direct();
    let mut builder = Client::builder()
        .timeout(spec.timeout)
        .connect_timeout(direct.settings.connect_timeout.unwrap_or(direct.timeout))
        .redirect(redirect_policy(spec.redirects.clone()))
        .danger_accept_invalid_certs(spec.insecure_skip_verify)
        .tls_info(true)
        .tcp_nodelay(direct.settings.nodelay)
        .tcp_keepalive(direct.settings.keep_alive)
        .pool_idle_timeout(spec.options.idle_connection_timeout)
        .no_proxy();

    if let Some(ref user_agent) = spec.profile.user_agent {
        builder = builder.user_agent(user_agent.as_str());
    }
    if let Some(addr) = direct.local_addr {
        builder = builder.local_address(addr);
    }
    if spec.options.disable_keep_alives {
        builder = builder.pool_max_idle_per_host(0);
    } else if let Some(max) = spec.options.max_idle_connections_per_host {
        builder = builder.pool_max_idle_per_host(max);
    }
    if spec.options.disable_compression {
        builder = builder.no_gzip().no_brotli();
    }
    let http1_only = spec.force_http1 || !spec.profile.supports_http2();
    if http1_only {
        builder = builder.http1_only();
    }
    if !spec.certificate_pins.is_empty() {
        // pins are checked inside the handshake, before any request bytes
        builder = builder.use_preconfigured_tls(pinned_tls_config(spec, http1_only));
    }
    if spec.disable_ipv4 || spec.disable_ipv6 {
        builder = builder.dns_resolver(Arc::new(FamilyFilter {
            disable_ipv4: spec.disable_ipv4,
            disable_ipv6: spec.disable_ipv6,
        }));
    }
    if let Dialer::Connect(ref tunnel) = spec.dialer {
        builder = builder.proxy(tunnel_proxy(tunnel)?);
    }

    builder
        .build()
        .map_err(|e| Error::transport_build(e.to_string()))
}

fn tunnel_proxy(tunnel: &ConnectDialer) -> Result<Proxy> {
    let mut proxy = Proxy::all(tunnel.proxy.as_str())
        .map_err(|e| Error::transport_build(format!("invalid proxy: {}", e)))?;

    if let Some((ref user, ref pass)) = tunnel.credentials {
        proxy = proxy.basic_auth(user, pass);
    }
    for (name, value) in tunnel.connect_headers.iter() {
        if *name == PROXY_AUTHORIZATION {
            proxy = proxy.custom_http_auth(value.clone());
        } else {
            warn!(header = %name, "reqwest cannot send extra CONNECT headers, skipped");
        }
    }
    Ok(proxy)
}

/// Translate the session's redirect mode into reqwest's per-hop actions
fn redirect_policy(control: RedirectControl) -> Policy {
    Policy::custom(move |attempt| {
        let decision = control.mode().decide(&RedirectAttempt {
            status: attempt.status(),
            next: attempt.url(),
            previous: attempt.previous(),
        });
        match decision {
            RedirectDecision::Follow => attempt.follow(),
            RedirectDecision::Stop => attempt.stop(),
            RedirectDecision::Fail(reason) => attempt.error(reason),
        }
    })
}

/// Resolver that drops one address family
struct FamilyFilter {
    disable_ipv4: bool,
    disable_ipv6: bool,
}

impl Resolve for FamilyFilter {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_string();
        let (disable_ipv4, disable_ipv6) = (self.disable_ipv4, self.disable_ipv6);
        Box::pin(async move {
            resolve_filtered(&host, disable_ipv4, disable_ipv6)
                .await
                .map(|addrs| Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

async fn resolve_filtered(
    host: &str,
    disable_ipv4: bool,
    disable_ipv6: bool,
) -> std::result::Result<Vec<SocketAddr>, Box<dyn StdError + Send + Sync>> {
    let addrs: Vec<SocketAddr> = lookup_host((host, 0))
        .await?
        .filter(|a| !(a.is_ipv4() && disable_ipv4) && !(a.is_ipv6() && disable_ipv6))
        .collect();

    if addrs.is_empty() {
        return Err(Box::new(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no usable addresses for {}", host),
        )));
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::http::RedirectPolicy;
    use crate::transport::{
        new_direct_dialer, ClientProfile, DialerSettings, DirectDialer, TransportOptions,
    };

    fn spec() -> TransportSpec {
        TransportSpec {
            profile: ClientProfile::default(),
            options: TransportOptions::default(),
            dialer: new_direct_dialer(Duration::from_secs(5), None, DialerSettings::default()),
            timeout: Duration::from_secs(5),
            server_name_override: None,
            insecure_skip_verify: false,
            random_extension_order: true,
            force_http1: false,
            certificate_pins: Default::default(),
            bad_pin_handler: None,
            disable_ipv4: false,
            disable_ipv6: false,
            redirects: RedirectControl::new(RedirectPolicy::new(false, None)),
        }
    }

    #[test]
    fn test_build_direct() {
        assert!(ReqwestTransportBuilder.build(&spec()).is_ok());
    }

    #[test]
    fn test_build_tunnel() {
        let mut spec = spec();
        let mut connect_headers = HeaderMap::new();
        connect_headers.insert(PROXY_AUTHORIZATION, "Basic dTpw".parse().unwrap());
        spec.dialer = Dialer::Connect(ConnectDialer {
            proxy: Url::parse("http://127.0.0.1:3128").unwrap(),
            credentials: Some(("user".into(), "pass".into())),
            connect_headers,
            direct: DirectDialer {
                timeout: Duration::from_secs(5),
                local_addr: None,
                settings: DialerSettings::default(),
            },
        });
        spec.disable_ipv6 = true;

        assert!(ReqwestTransportBuilder.build(&spec).is_ok());
    }

    #[test]
    fn test_unsupported_knobs_fail_build() {
        let mut spec = spec();
        spec.server_name_override = Some("cdn.example.com".into());
        assert!(matches!(
            ReqwestTransportBuilder.build(&spec),
            Err(Error::TransportBuild(_))
        ));

        let mut spec = self::spec();
        spec.disable_ipv4 = true;
        spec.disable_ipv6 = true;
        assert!(matches!(
            ReqwestTransportBuilder.build(&spec),
            Err(Error::TransportBuild(_))
        ));
    }

    #[test]
    fn test_build_with_pins() {
        let mut spec = spec();
        spec.certificate_pins
            .insert("example.com".into(), vec!["sha256/AAAA".into()]);
        assert!(ReqwestTransportBuilder.build(&spec).is_ok());

        let config = pinned_tls_config(&spec, false);
        assert_eq!(config.alpn_protocols, vec![b"h2".to_vec(), b"http/1.1".to_vec()]);
        let config = pinned_tls_config(&spec, true);
        assert_eq!(config.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }

    #[tokio::test]
    async fn test_family_filter() {
        let v4 = resolve_filtered("127.0.0.1", false, true).await.unwrap();
        assert!(v4.iter().all(|a| a.is_ipv4()));

        assert!(resolve_filtered("127.0.0.1", true, false).await.is_err());
    }
}
