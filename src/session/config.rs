// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session configuration

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};
use crate::http::{CookieStore, FastCookieStore, RedirectControl, RedirectFn};
use crate::transport::{
    new_connect_dialer, new_direct_dialer, BadPinHandler, CertificatePins, ClientProfile, Dialer,
    DialerSettings, TransportOptions, TransportSpec,
};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything a session is constructed from
#[derive(Clone)]
pub struct SessionConfig {
    /// Follow redirects automatically
    pub follow_redirects: bool,
    /// Decides redirects when following is enabled
    pub custom_redirect: Option<RedirectFn>,
    /// Proxy URL, empty for direct connections
    pub proxy_url: String,
    /// Headers sent on the proxy CONNECT request
    pub connect_headers: HeaderMap,
    /// Headers for requests that arrive without any
    pub default_headers: HeaderMap,
    /// Header order used together with `default_headers`
    pub default_header_order: Vec<String>,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Local address to bind outgoing connections to
    pub local_addr: Option<IpAddr>,
    /// Socket settings
    pub dialer: DialerSettings,
    /// Fingerprint profile
    pub profile: ClientProfile,
    pub transport_options: TransportOptions,
    pub server_name_override: Option<String>,
    /// Accept invalid certificates (dangerous!)
    pub insecure_skip_verify: bool,
    pub random_extension_order: bool,
    pub force_http1: bool,
    pub certificate_pins: CertificatePins,
    pub bad_pin_handler: Option<BadPinHandler>,
    pub disable_ipv4: bool,
    pub disable_ipv6: bool,
    /// Standard URL-keyed cookie store
    pub cookie_jar: Option<Arc<dyn CookieStore>>,
    /// Flat cookie store injected into every request
    pub fast_cookie_store: Option<FastCookieStore>,
    /// Emit per-request debug events
    pub debug: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            custom_redirect: None,
            proxy_url: String::new(),
            connect_headers: HeaderMap::new(),
            default_headers: HeaderMap::new(),
            default_header_order: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            local_addr: None,
            dialer: DialerSettings::default(),
            profile: ClientProfile::default(),
            transport_options: TransportOptions::default(),
            server_name_override: None,
            insecure_skip_verify: false,
            random_extension_order: false,
            force_http1: false,
            certificate_pins: CertificatePins::new(),
            bad_pin_handler: None,
            disable_ipv4: false,
            disable_ipv6: false,
            cookie_jar: None,
            fast_cookie_store: None,
            debug: false,
        }
    }
}

impl SessionConfig {
    /// Build a config from options applied in order over the defaults
    pub fn from_options(options: impl IntoIterator<Item = SessionOption>) -> Self {
        let mut config = Self::default();
        for option in options {
            option.apply(&mut config);
        }
        config
    }

    /// Reject contradictory option combinations
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        if self.disable_ipv4 && self.disable_ipv6 {
            return Err(Error::config("IPv4 and IPv6 cannot both be disabled"));
        }
        if self.bad_pin_handler.is_some() && self.certificate_pins.is_empty() {
            return Err(Error::config("bad pin handler set without certificate pins"));
        }
        Ok(())
    }

    /// The immutable part used for every transport rebuild
    pub(crate) fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            profile: self.profile.clone(),
            options: self.transport_options.clone(),
            timeout: self.timeout,
            local_addr: self.local_addr,
            dialer: self.dialer.clone(),
            connect_headers: self.connect_headers.clone(),
            server_name_override: self.server_name_override.clone(),
            insecure_skip_verify: self.insecure_skip_verify,
            random_extension_order: self.random_extension_order,
            force_http1: self.force_http1,
            certificate_pins: self.certificate_pins.clone(),
            bad_pin_handler: self.bad_pin_handler.clone(),
            disable_ipv4: self.disable_ipv4,
            disable_ipv6: self.disable_ipv6,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("follow_redirects", &self.follow_redirects)
            .field("custom_redirect", &self.custom_redirect.is_some())
            .field("proxy_url", &self.proxy_url)
            .field("timeout", &self.timeout)
            .field("profile", &self.profile.name)
            .field("force_http1", &self.force_http1)
            .field("cookie_jar", &self.cookie_jar.is_some())
            .field("fast_cookie_store", &self.fast_cookie_store)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// One configuration option, applied at construction
#[derive(Clone)]
pub enum SessionOption {
    Timeout(Duration),
    Profile(ClientProfile),
    RandomExtensionOrder,
    FollowRedirects,
    NotFollowRedirects,
    CustomRedirect(RedirectFn),
    Proxy(String),
    LocalAddr(IpAddr),
    Dialer(DialerSettings),
    ConnectHeaders(HeaderMap),
    /// Default headers and their wire order
    DefaultHeaders(HeaderMap, Vec<String>),
    CookieJar(Arc<dyn CookieStore>),
    FastCookieStore(FastCookieStore),
    InsecureSkipVerify,
    ServerNameOverride(String),
    CertificatePins(CertificatePins, Option<BadPinHandler>),
    ForceHttp1,
    DisableIpv4,
    DisableIpv6,
    TransportOptions(TransportOptions),
    Debug,
}

impl SessionOption {
    /// Default headers from name/value pairs; the pair order is the wire order
    pub fn default_headers<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut headers = HeaderMap::new();
        let mut order = Vec::new();
        for (name, value) in pairs {
            if let (Ok(n), Ok(v)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.append(n, v);
                order.push(name.to_string());
            }
        }
        SessionOption::DefaultHeaders(headers, order)
    }

    /// Apply this option to a config
    pub fn apply(self, config: &mut SessionConfig) {
        match self {
            SessionOption::Timeout(t) => config.timeout = t,
            SessionOption::Profile(p) => config.profile = p,
            SessionOption::RandomExtensionOrder => config.random_extension_order = true,
            SessionOption::FollowRedirects => config.follow_redirects = true,
            SessionOption::NotFollowRedirects => config.follow_redirects = false,
            SessionOption::CustomRedirect(f) => config.custom_redirect = Some(f),
            SessionOption::Proxy(url) => config.proxy_url = url,
            SessionOption::LocalAddr(addr) => config.local_addr = Some(addr),
            SessionOption::Dialer(settings) => config.dialer = settings,
            SessionOption::ConnectHeaders(headers) => config.connect_headers = headers,
            SessionOption::DefaultHeaders(headers, order) => {
                config.default_headers = headers;
                config.default_header_order = order;
            }
            SessionOption::CookieJar(jar) => config.cookie_jar = Some(jar),
            SessionOption::FastCookieStore(store) => config.fast_cookie_store = Some(store),
            SessionOption::InsecureSkipVerify => config.insecure_skip_verify = true,
            SessionOption::ServerNameOverride(name) => config.server_name_override = Some(name),
            SessionOption::CertificatePins(pins, handler) => {
                config.certificate_pins = pins;
                config.bad_pin_handler = handler;
            }
            SessionOption::ForceHttp1 => config.force_http1 = true,
            SessionOption::DisableIpv4 => config.disable_ipv4 = true,
            SessionOption::DisableIpv6 => config.disable_ipv6 = true,
            SessionOption::TransportOptions(options) => config.transport_options = options,
            SessionOption::Debug => config.debug = true,
        }
    }
}

impl fmt::Debug for SessionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOption::Timeout(t) => f.debug_tuple("Timeout").field(t).finish(),
            SessionOption::Profile(p) => f.debug_tuple("Profile").field(&p.name).finish(),
            SessionOption::Proxy(url) => f.debug_tuple("Proxy").field(url).finish(),
            SessionOption::CustomRedirect(_) => f.write_str("CustomRedirect(..)"),
            SessionOption::CookieJar(_) => f.write_str("CookieJar(..)"),
            SessionOption::CertificatePins(pins, _) => {
                f.debug_tuple("CertificatePins").field(&pins.len()).finish()
            }
            other => f.write_str(other.name()),
        }
    }
}

impl SessionOption {
    fn name(&self) -> &'static str {
        match self {
            SessionOption::Timeout(_) => "Timeout",
            SessionOption::Profile(_) => "Profile",
            SessionOption::RandomExtensionOrder => "RandomExtensionOrder",
            SessionOption::FollowRedirects => "FollowRedirects",
            SessionOption::NotFollowRedirects => "NotFollowRedirects",
            SessionOption::CustomRedirect(_) => "CustomRedirect",
            SessionOption::Proxy(_) => "Proxy",
            SessionOption::LocalAddr(_) => "LocalAddr",
            SessionOption::Dialer(_) => "Dialer",
            SessionOption::ConnectHeaders(_) => "ConnectHeaders",
            SessionOption::DefaultHeaders(..) => "DefaultHeaders",
            SessionOption::CookieJar(_) => "CookieJar",
            SessionOption::FastCookieStore(_) => "FastCookieStore",
            SessionOption::InsecureSkipVerify => "InsecureSkipVerify",
            SessionOption::ServerNameOverride(_) => "ServerNameOverride",
            SessionOption::CertificatePins(..) => "CertificatePins",
            SessionOption::ForceHttp1 => "ForceHttp1",
            SessionOption::DisableIpv4 => "DisableIpv4",
            SessionOption::DisableIpv6 => "DisableIpv6",
            SessionOption::TransportOptions(_) => "TransportOptions",
            SessionOption::Debug => "Debug",
        }
    }
}

/// A fresh default option list. Each call allocates a new `Vec`, so callers
/// may extend it freely.
pub fn default_options() -> Vec<SessionOption> {
    vec![
        SessionOption::Timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        SessionOption::Profile(ClientProfile::default()),
        SessionOption::RandomExtensionOrder,
        SessionOption::NotFollowRedirects,
    ]
}

/// Inputs for building a transport, fixed for the session's lifetime
#[derive(Clone)]
pub(crate) struct TransportSettings {
    profile: ClientProfile,
    options: TransportOptions,
    timeout: Duration,
    local_addr: Option<IpAddr>,
    dialer: DialerSettings,
    connect_headers: HeaderMap,
    server_name_override: Option<String>,
    insecure_skip_verify: bool,
    random_extension_order: bool,
    force_http1: bool,
    certificate_pins: CertificatePins,
    bad_pin_handler: Option<BadPinHandler>,
    disable_ipv4: bool,
    disable_ipv6: bool,
}

impl TransportSettings {
    /// Dialer for `proxy_url`, direct when empty
    pub(crate) async fn dialer(&self, proxy_url: &str) -> Result<Dialer> {
        if proxy_url.is_empty() {
            return Ok(new_direct_dialer(
                self.timeout,
                self.local_addr,
                self.dialer.clone(),
            ));
        }
        new_connect_dialer(
            proxy_url,
            self.timeout,
            self.local_addr,
            self.dialer.clone(),
            self.connect_headers.clone(),
        )
        .await
    }

    pub(crate) fn spec(&self, dialer: Dialer, redirects: RedirectControl) -> TransportSpec {
        TransportSpec {
            profile: self.profile.clone(),
            options: self.options.clone(),
            dialer,
            timeout: self.timeout,
            server_name_override: self.server_name_override.clone(),
            insecure_skip_verify: self.insecure_skip_verify,
            random_extension_order: self.random_extension_order,
            force_http1: self.force_http1,
            certificate_pins: self.certificate_pins.clone(),
            bad_pin_handler: self.bad_pin_handler.clone(),
            disable_ipv4: self.disable_ipv4,
            disable_ipv6: self.disable_ipv6,
            redirects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_fresh() {
        let mut first = default_options();
        first.push(SessionOption::Debug);
        let second = default_options();

        assert_eq!(first.len(), second.len() + 1);
        let config = SessionConfig::from_options(second);
        assert!(!config.follow_redirects);
        assert!(config.random_extension_order);
        assert!(!config.debug);
    }

    #[test]
    fn test_options_apply_in_order() {
        let config = SessionConfig::from_options([
            SessionOption::NotFollowRedirects,
            SessionOption::FollowRedirects,
            SessionOption::Proxy("http://127.0.0.1:8080".into()),
            SessionOption::default_headers([("User-Agent", "ua"), ("Accept", "*/*")]),
        ]);

        assert!(config.follow_redirects);
        assert_eq!(config.proxy_url, "http://127.0.0.1:8080");
        assert_eq!(config.default_headers.len(), 2);
        assert_eq!(config.default_header_order, vec!["User-Agent", "Accept"]);
    }

    #[test]
    fn test_validate() {
        assert!(SessionConfig::default().validate().is_ok());

        let config =
            SessionConfig::from_options([SessionOption::DisableIpv4, SessionOption::DisableIpv6]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = SessionConfig::from_options([SessionOption::Timeout(Duration::ZERO)]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let handler: BadPinHandler = Arc::new(|_| {});
        let config = SessionConfig::from_options([SessionOption::CertificatePins(
            CertificatePins::new(),
            Some(handler),
        )]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
