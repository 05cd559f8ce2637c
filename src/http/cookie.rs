// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL-keyed cookie storage
//!
//! [`CookieStore`] is the seam the session talks to; [`CookieJar`] is the
//! bundled implementation. The session never writes to this store on its own:
//! callers move cookies in and out with `Session::cookies` and
//! `Session::set_cookies`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// Cookie as held by a [`CookieStore`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Owning domain, empty until stored against a URL
    #[serde(default)]
    pub domain: String,
    #[serde(default = "root_path")]
    pub path: String,
    /// `None` for session cookies
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

fn root_path() -> String {
    "/".to_string()
}

impl Cookie {
    /// Session cookie for the root path, not yet bound to a domain
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: root_path(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set the owning domain, a leading dot is dropped
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into().trim_start_matches('.').to_string();
        self
    }

    /// Set the path scope
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Only send over https
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Mark as hidden from scripts
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set an absolute expiry
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Whether the expiry lies in the past
    pub fn is_expired(&self) -> bool {
        matches!(self.expires, Some(at) if at <= Utc::now())
    }

    /// Whether this cookie applies to `url`: domain or subdomain, path
    /// scope, scheme for secure cookies, not expired
    pub fn matches(&self, url: &Url) -> bool {
        if self.is_expired() || (self.secure && url.scheme() != "https") {
            return false;
        }
        if !path_matches(&self.path, url.path()) {
            return false;
        }

        let host = url.host_str().unwrap_or_default();
        self.domain.is_empty()
            || host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .map_or(false, |rest| rest.ends_with('.'))
    }
}

/// Path scope: exact, or a prefix ending on a `/` boundary
fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some(rest) => rest.is_empty() || cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

/// Standard URL-keyed cookie store
pub trait CookieStore: Send + Sync {
    /// Cookies that should be sent to `url`
    fn cookies(&self, url: &Url) -> Vec<Cookie>;

    /// Store cookies for `url`
    fn set_cookies(&self, url: &Url, cookies: Vec<Cookie>);
}

/// Cookies grouped by domain. Clones share the same storage.
#[derive(Clone, Default)]
pub struct CookieJar {
    by_domain: Arc<DashMap<String, Vec<Cookie>>>,
}

impl CookieJar {
    /// Empty jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cookie, replacing one with the same name and path
    pub fn insert(&self, cookie: Cookie) {
        let mut bucket = self.by_domain.entry(cookie.domain.clone()).or_default();
        bucket.retain(|c| c.name != cookie.name || c.path != cookie.path);
        bucket.push(cookie);
    }

    /// Drop every cookie
    pub fn clear(&self) {
        self.by_domain.clear();
    }

    /// Number of cookies, expired ones included until the next lookup
    pub fn len(&self) -> usize {
        self.by_domain.iter().map(|bucket| bucket.len()).sum()
    }

    /// Whether the jar holds no cookies
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize every cookie as a JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        let all: Vec<Cookie> = self
            .by_domain
            .iter()
            .flat_map(|bucket| bucket.value().clone())
            .collect();
        serde_json::to_string(&all)
    }

    /// Rebuild a jar from [`CookieJar::to_json`] output
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let jar = Self::new();
        for cookie in serde_json::from_str::<Vec<Cookie>>(json)? {
            jar.insert(cookie);
        }
        Ok(jar)
    }

    fn purge_expired(&self) {
        self.by_domain.retain(|_, bucket| {
            bucket.retain(|c| !c.is_expired());
            !bucket.is_empty()
        });
    }
}

impl CookieStore for CookieJar {
    fn cookies(&self, url: &Url) -> Vec<Cookie> {
        self.purge_expired();

        let mut found: Vec<Cookie> = Vec::new();
        for bucket in self.by_domain.iter() {
            found.extend(bucket.iter().filter(|c| c.matches(url)).cloned());
        }
        // most specific path first
        found.sort_by_key(|c| std::cmp::Reverse(c.path.len()));
        found
    }

    fn set_cookies(&self, url: &Url, cookies: Vec<Cookie>) {
        let host = url.host_str().unwrap_or_default();
        for mut cookie in cookies {
            if cookie.domain.is_empty() {
                cookie.domain = host.to_string();
            }
            self.insert(cookie);
        }
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar").field("cookies", &self.len()).finish()
    }
}
