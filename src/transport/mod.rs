// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport seam
//!
//! The session drives requests through a [`RoundTripper`] produced by a
//! [`TransportBuilder`] from a [`TransportSpec`]. The bundled builder is
//! [`ReqwestTransportBuilder`]; tests and embedders can supply their own.

mod backend;
mod dialer;
mod pinning;
mod profile;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;
use crate::http::{RawResponse, RedirectControl, Request};

pub use backend::{ReqwestRoundTripper, ReqwestTransportBuilder};
pub use dialer::{
    new_connect_dialer, new_direct_dialer, parse_proxy_url, ConnectDialer, Dialer,
    DialerSettings, DirectDialer,
};
pub use pinning::pin_for_certificate;
pub use profile::{default_profile, ClientProfile};

/// Executes a single request and returns the response head with an undrained
/// body
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use seepia::http::{RawResponse, Request};
/// use seepia::transport::RoundTripper;
/// use seepia::{Error, Result};
///
/// struct Offline;
///
/// #[async_trait]
/// impl RoundTripper for Offline {
///     async fn round_trip(&self, _request: Request) -> Result<RawResponse> {
///         Err(Error::network("offline"))
///     }
/// }
/// ```
#[async_trait]
pub trait RoundTripper: Send + Sync {
    /// Send the request
    async fn round_trip(&self, request: Request) -> Result<RawResponse>;

    /// Release pooled idle connections. Must not block.
    fn close_idle_connections(&self) {}
}

/// Builds round-trippers
pub trait TransportBuilder: Send + Sync {
    /// Build a round-tripper for `spec`
    fn build(&self, spec: &TransportSpec) -> Result<Arc<dyn RoundTripper>>;
}

/// Connection pool and body handling knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    /// How long an idle pooled connection is kept
    pub idle_connection_timeout: Option<Duration>,
    /// Idle connections kept per host
    pub max_idle_connections_per_host: Option<usize>,
    /// Never reuse connections
    pub disable_keep_alives: bool,
    /// Do not advertise or decode compressed bodies
    pub disable_compression: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            idle_connection_timeout: Some(Duration::from_secs(90)),
            max_idle_connections_per_host: None,
            disable_keep_alives: false,
            disable_compression: false,
        }
    }
}

/// Host → base64 SHA-256 pins of acceptable leaf certificates
pub type CertificatePins = HashMap<String, Vec<String>>;

/// Called with `https://<host>/` when a pinned host presents another
/// certificate
pub type BadPinHandler = Arc<dyn Fn(&Url) + Send + Sync>;

/// Everything a builder needs to produce a round-tripper
#[derive(Clone)]
pub struct TransportSpec {
    pub profile: ClientProfile,
    pub options: TransportOptions,
    pub dialer: Dialer,
    /// Whole-request timeout
    pub timeout: Duration,
    pub server_name_override: Option<String>,
    pub insecure_skip_verify: bool,
    pub random_extension_order: bool,
    pub force_http1: bool,
    pub certificate_pins: CertificatePins,
    pub bad_pin_handler: Option<BadPinHandler>,
    pub disable_ipv4: bool,
    pub disable_ipv6: bool,
    /// Consulted on every redirect hop
    pub redirects: RedirectControl,
}

impl fmt::Debug for TransportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportSpec")
            .field("profile", &self.profile.name)
            .field("dialer", &self.dialer)
            .field("timeout", &self.timeout)
            .field("force_http1", &self.force_http1)
            .field("pinned_hosts", &self.certificate_pins.len())
            .field("redirects", &self.redirects)
            .finish()
    }
}
