// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The session
//!
//! A [`Session`] is a cheap, cloneable handle. All clones share one active
//! transport, one redirect policy, one set of default headers and the cookie
//! stores.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::config::{default_options, SessionConfig, SessionOption, TransportSettings};
use super::cookies::CookieCoordinator;
use crate::error::{Error, ExecuteError, Result};
use crate::http::{
    drain_body, Cookie, CookieJar, CookieStore, FastCookieStore, HeaderNormalizer, RawResponse,
    RedirectControl, RedirectPolicy, Request, Response,
};
use crate::transport::{ReqwestTransportBuilder, RoundTripper, TransportBuilder};

/// Proxy URL and the round-tripper built for it, always replaced together
struct ActiveTransport {
    proxy_url: String,
    round_tripper: Arc<dyn RoundTripper>,
}

struct SessionInner {
    settings: TransportSettings,
    builder: Arc<dyn TransportBuilder>,
    active: RwLock<ActiveTransport>,
    redirects: RedirectControl,
    headers: HeaderNormalizer,
    cookies: CookieCoordinator,
    /// Serializes proxy changes
    reconfigure: tokio::sync::Mutex<()>,
    debug: bool,
}

/// HTTP session with a swappable fingerprinting transport
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session with the bundled reqwest transport
    pub async fn new(options: impl IntoIterator<Item = SessionOption>) -> Result<Self> {
        Self::with_builder(options, Arc::new(ReqwestTransportBuilder)).await
    }

    /// Create a session with a custom transport builder
    pub async fn with_builder(
        options: impl IntoIterator<Item = SessionOption>,
        builder: Arc<dyn TransportBuilder>,
    ) -> Result<Self> {
        Self::from_config(SessionConfig::from_options(options), builder).await
    }

    /// Create a session with the default options and a fresh cookie jar
    pub async fn with_defaults() -> Result<Self> {
        let mut options = default_options();
        options.push(SessionOption::CookieJar(Arc::new(CookieJar::new())));
        Self::new(options).await
    }

    /// Create a session from a complete config
    pub async fn from_config(
        config: SessionConfig,
        builder: Arc<dyn TransportBuilder>,
    ) -> Result<Self> {
        config.validate()?;

        let settings = config.transport_settings();
        let redirects = RedirectControl::new(RedirectPolicy::new(
            config.follow_redirects,
            config.custom_redirect.clone(),
        ));

        let dialer = settings.dialer(&config.proxy_url).await?;
        let round_tripper = builder.build(&settings.spec(dialer, redirects.clone()))?;

        info!(
            profile = %config.profile.name,
            proxied = !config.proxy_url.is_empty(),
            follow_redirects = config.follow_redirects,
            "Session created"
        );

        Ok(Self {
            inner: Arc::new(SessionInner {
                settings,
                builder,
                active: RwLock::new(ActiveTransport {
                    proxy_url: config.proxy_url,
                    round_tripper,
                }),
                redirects,
                headers: HeaderNormalizer::new(config.default_headers, config.default_header_order),
                cookies: CookieCoordinator::new(config.cookie_jar, config.fast_cookie_store),
                reconfigure: tokio::sync::Mutex::new(()),
                debug: config.debug,
            }),
        })
    }

    /// Execute a request.
    ///
    /// On failure the returned [`ExecuteError`] still carries a response:
    /// the `-1` placeholder when nothing was received, or the populated
    /// snapshot when the body could not be read.
    pub async fn execute(&self, mut request: Request) -> std::result::Result<Response, ExecuteError> {
        let inner = &self.inner;
        let caller_empty = request.headers.is_empty() && request.header_order.is_empty();

        inner.cookies.inject(&mut request);
        inner.headers.normalize(&mut request, caller_empty);

        let round_tripper = inner.active.read().round_tripper.clone();

        if inner.debug {
            debug!(
                method = %request.method,
                url = %request.url,
                header_order = ?request.header_order,
                "Sending request"
            );
        }

        let RawResponse { head, body } = match round_tripper.round_trip(request).await {
            Ok(raw) => raw,
            Err(error) => {
                if inner.debug {
                    debug!(error = %error, "Request failed");
                }
                return Err(ExecuteError::new(Response::failed(), error));
            }
        };

        let mut response = Response::snapshot(&head);
        inner.cookies.extract(&response.headers);

        match drain_body(body).await {
            Ok(bytes) => {
                response.set_body(bytes);
                if inner.debug {
                    debug!(
                        status = response.status_code,
                        proto = %response.proto,
                        bytes = response.body_bytes.as_ref().map_or(0, |b| b.len()),
                        "Received response"
                    );
                }
                Ok(response)
            }
            Err(error) => {
                warn!(status = response.status_code, error = %error, "Failed to read response body");
                Err(ExecuteError::new(response, error))
            }
        }
    }

    /// GET `url`
    pub async fn get(&self, url: &str) -> std::result::Result<Response, ExecuteError> {
        match Request::get(url) {
            Ok(request) => self.execute(request).await,
            Err(error) => Err(ExecuteError::new(Response::failed(), error)),
        }
    }

    /// Switch to `proxy_url`, or to direct connections when empty.
    ///
    /// The new transport is built before anything is replaced. If that
    /// fails the previous proxy is rebuilt and installed and the original
    /// error is returned. If the rebuild fails too, the session keeps its
    /// previous transport and [`Error::ProxyRollback`] is returned.
    pub async fn set_proxy(&self, proxy_url: &str) -> Result<()> {
        let _guard = self.inner.reconfigure.lock().await;
        let previous = self.inner.active.read().proxy_url.clone();

        debug!(from = %previous, to = %proxy_url, "Changing proxy");

        match self.build_transport(proxy_url).await {
            Ok(round_tripper) => {
                self.install(proxy_url.to_string(), round_tripper);
                info!(proxy = %proxy_url, "Proxy changed");
                Ok(())
            }
            Err(original) => {
                warn!(requested = %proxy_url, error = %original, "Proxy change failed, restoring previous proxy");

                match self.build_transport(&previous).await {
                    Ok(round_tripper) => {
                        self.install(previous, round_tripper);
                        Err(original)
                    }
                    Err(rollback) => {
                        warn!(previous = %previous, error = %rollback, "Proxy rollback failed");
                        Err(Error::ProxyRollback {
                            requested: proxy_url.to_string(),
                            previous,
                            original: Box::new(original),
                            rollback: Box::new(rollback),
                        })
                    }
                }
            }
        }
    }

    /// Current proxy URL, empty when direct
    pub fn proxy(&self) -> String {
        self.inner.active.read().proxy_url.clone()
    }

    /// Enable or disable automatic redirects for subsequent requests
    pub fn set_follow_redirect(&self, follow: bool) {
        let previous = self.inner.redirects.follow();
        debug!(from = previous, to = follow, "Changing redirect policy");
        self.inner.redirects.set_follow(follow);
    }

    /// Whether redirects are followed
    pub fn follow_redirect(&self) -> bool {
        self.inner.redirects.follow()
    }

    /// Release idle pooled connections of the active transport
    pub fn close_idle_connections(&self) {
        let round_tripper = self.inner.active.read().round_tripper.clone();
        round_tripper.close_idle_connections();
    }

    /// Cookies the standard jar holds for `url`
    pub fn cookies(&self, url: &Url) -> Vec<Cookie> {
        self.inner.cookies.cookies(url)
    }

    /// Store cookies in the standard jar
    pub fn set_cookies(&self, url: &Url, cookies: Vec<Cookie>) {
        self.inner.cookies.set_cookies(url, cookies)
    }

    /// The standard jar, if one is configured
    pub fn cookie_jar(&self) -> Option<Arc<dyn CookieStore>> {
        self.inner.cookies.jar()
    }

    /// Replace or remove the standard jar
    pub fn set_cookie_jar(&self, jar: Option<Arc<dyn CookieStore>>) {
        self.inner.cookies.set_jar(jar)
    }

    /// The fast store, if one is configured
    pub fn fast_cookie_store(&self) -> Option<FastCookieStore> {
        self.inner.cookies.fast_store()
    }

    /// Replace or remove the fast store. Later requests use the new store.
    pub fn set_fast_cookie_store(&self, store: Option<FastCookieStore>) {
        self.inner.cookies.set_fast_store(store)
    }

    async fn build_transport(&self, proxy_url: &str) -> Result<Arc<dyn RoundTripper>> {
        let settings = &self.inner.settings;
        let dialer = settings.dialer(proxy_url).await?;
        self.inner
            .builder
            .build(&settings.spec(dialer, self.inner.redirects.clone()))
    }

    fn install(&self, proxy_url: String, round_tripper: Arc<dyn RoundTripper>) {
        *self.inner.active.write() = ActiveTransport {
            proxy_url,
            round_tripper,
        };
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("proxy", &self.proxy())
            .field("redirects", &self.inner.redirects)
            .finish_non_exhaustive()
    }
}
