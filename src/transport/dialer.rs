// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Dialer construction
//!
//! A [`Dialer`] describes how the transport reaches the origin: directly, or
//! through an HTTP CONNECT tunnel. Building a tunnel dialer validates the
//! proxy URL and resolves the proxy host, so an unusable proxy fails here
//! instead of on the first request.

use std::borrow::Cow;
use std::net::IpAddr;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tokio::net::lookup_host;
use url::Url;

use crate::error::{Error, Result};

/// Low-level socket settings, the "custom dialer" of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialerSettings {
    /// TCP keep-alive interval
    pub keep_alive: Option<Duration>,
    /// Disable Nagle's algorithm
    pub nodelay: bool,
    /// Bound on connection establishment, defaults to the session timeout
    pub connect_timeout: Option<Duration>,
}

/// Direct connection settings
#[derive(Debug, Clone)]
pub struct DirectDialer {
    pub timeout: Duration,
    pub local_addr: Option<IpAddr>,
    pub settings: DialerSettings,
}

/// CONNECT tunnel through an HTTP(S) proxy
#[derive(Debug, Clone)]
pub struct ConnectDialer {
    /// Proxy URL without credentials
    pub proxy: Url,
    /// `user`, `password` taken from the proxy URL
    pub credentials: Option<(String, String)>,
    /// Extra headers for the CONNECT request
    pub connect_headers: HeaderMap,
    /// How the proxy itself is reached
    pub direct: DirectDialer,
}

/// How connections are established
#[derive(Debug, Clone)]
pub enum Dialer {
    Direct(DirectDialer),
    Connect(ConnectDialer),
}

impl Dialer {
    /// Whether this dialer tunnels through a proxy
    pub fn is_proxied(&self) -> bool {
        matches!(self, Dialer::Connect(_))
    }

    /// The direct leg, for the proxy itself in the tunnel case
    pub fn direct(&self) -> &DirectDialer {
        match self {
            Dialer::Direct(d) => d,
            Dialer::Connect(c) => &c.direct,
        }
    }
}

/// Build a direct dialer
pub fn new_direct_dialer(
    timeout: Duration,
    local_addr: Option<IpAddr>,
    settings: DialerSettings,
) -> Dialer {
    Dialer::Direct(DirectDialer {
        timeout,
        local_addr,
        settings,
    })
}

/// Build a CONNECT tunnel dialer for `proxy_url`.
///
/// `proxy_url` is `scheme://[user[:pass]@]host:port` with scheme `http` or
/// `https`. The proxy host must resolve within `timeout`.
pub async fn new_connect_dialer(
    proxy_url: &str,
    timeout: Duration,
    local_addr: Option<IpAddr>,
    settings: DialerSettings,
    connect_headers: HeaderMap,
) -> Result<Dialer> {
    let (proxy, credentials) = parse_proxy_url(proxy_url)?;

    let host = proxy
        .host_str()
        .ok_or_else(|| Error::transport_build(format!("proxy URL has no host: {}", proxy)))?;
    let port = proxy
        .port_or_known_default()
        .ok_or_else(|| Error::transport_build(format!("proxy URL has no port: {}", proxy)))?;

    resolve_proxy(host, port, timeout).await?;

    Ok(Dialer::Connect(ConnectDialer {
        proxy,
        credentials,
        connect_headers,
        direct: DirectDialer {
            timeout,
            local_addr,
            settings,
        },
    }))
}

/// Split a proxy URL into the bare URL and its credentials
pub fn parse_proxy_url(proxy_url: &str) -> Result<(Url, Option<(String, String)>)> {
    let mut url = Url::parse(proxy_url)
        .map_err(|e| Error::transport_build(format!("invalid proxy URL '{}': {}", proxy_url, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::transport_build(format!(
                "unsupported proxy scheme '{}', expected http or https",
                other
            )))
        }
    }

    let credentials = if url.username().is_empty() {
        None
    } else {
        let password = match url.password() {
            Some(password) => decode_credential(password)?,
            None => String::new(),
        };
        Some((decode_credential(url.username())?, password))
    };

    // both setters only fail for cannot-be-a-base URLs, excluded by the scheme check
    let _ = url.set_username("");
    let _ = url.set_password(None);

    Ok((url, credentials))
}

async fn resolve_proxy(host: &str, port: u16, timeout: Duration) -> Result<()> {
    let target = format!("{}:{}", host.trim_start_matches('[').trim_end_matches(']'), port);

    let mut addrs = tokio::time::timeout(timeout, lookup_host(target.as_str()))
        .await
        .map_err(|_| {
            Error::transport_build(format!(
                "resolving proxy {} timed out after {}ms",
                target,
                timeout.as_millis()
            ))
        })?
        .map_err(|e| Error::transport_build(format!("proxy {} unresolvable: {}", target, e)))?;

    if addrs.next().is_none() {
        return Err(Error::transport_build(format!(
            "proxy {} resolved to no addresses",
            target
        )));
    }
    Ok(())
}

fn decode_credential(raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .map_err(|e| Error::transport_build(format!("proxy credentials are not valid UTF-8: {}", e)))
}
