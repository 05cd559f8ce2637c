// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie handling around each request
//!
//! The fast store is authoritative for the outgoing `Cookie` header and is
//! updated from every response. The standard jar is only touched through the
//! explicit accessors.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use tracing::{debug, warn};
use url::Url;

use crate::http::{Cookie, CookieStore, FastCookieStore, Request};

pub(crate) struct CookieCoordinator {
    jar: RwLock<Option<Arc<dyn CookieStore>>>,
    fast: RwLock<Option<FastCookieStore>>,
}

impl CookieCoordinator {
    pub(crate) fn new(jar: Option<Arc<dyn CookieStore>>, fast: Option<FastCookieStore>) -> Self {
        Self {
            jar: RwLock::new(jar),
            fast: RwLock::new(fast),
        }
    }

    /// Overwrite the request's `Cookie` header with the fast store contents
    pub(crate) fn inject(&self, request: &mut Request) {
        let Some(fast) = self.fast.read().clone() else {
            return;
        };
        let cookies = fast.cookie_string();
        if cookies.is_empty() {
            return;
        }

        match HeaderValue::from_str(&cookies) {
            Ok(value) => {
                request.headers.insert(COOKIE, value);
            }
            Err(_) => warn!(url = %request.url, "fast cookie store holds an invalid header value"),
        }
    }

    /// Merge `Set-Cookie` headers into the fast store
    pub(crate) fn extract(&self, headers: &HeaderMap) {
        if let Some(fast) = self.fast.read().clone() {
            let merged = fast.process_set_cookies(headers);
            if merged > 0 {
                debug!(merged, "updated fast cookie store");
            }
        }
    }

    pub(crate) fn cookies(&self, url: &Url) -> Vec<Cookie> {
        debug!(%url, "get cookies");
        match self.jar.read().as_ref() {
            Some(jar) => jar.cookies(url),
            None => {
                warn!("no cookie jar configured");
                Vec::new()
            }
        }
    }

    pub(crate) fn set_cookies(&self, url: &Url, cookies: Vec<Cookie>) {
        debug!(%url, count = cookies.len(), "set cookies");
        match self.jar.read().as_ref() {
            Some(jar) => jar.set_cookies(url, cookies),
            None => warn!("no cookie jar configured"),
        }
    }

    pub(crate) fn jar(&self) -> Option<Arc<dyn CookieStore>> {
        self.jar.read().clone()
    }

    pub(crate) fn set_jar(&self, jar: Option<Arc<dyn CookieStore>>) {
        *self.jar.write() = jar;
    }

    pub(crate) fn fast_store(&self) -> Option<FastCookieStore> {
        self.fast.read().clone()
    }

    pub(crate) fn set_fast_store(&self, store: Option<FastCookieStore>) {
        *self.fast.write() = store;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::CookieJar;
    use reqwest::header::SET_COOKIE;

    #[test]
    fn test_inject_overwrites_caller_cookie() {
        let coordinator = CookieCoordinator::new(None, Some(FastCookieStore::from_header("a=1; b=2")));
        let mut req = Request::get("https://example.com")
            .unwrap()
            .header("cookie", "caller=9");

        coordinator.inject(&mut req);

        assert_eq!(req.headers.get(COOKIE).unwrap(), "a=1; b=2");
        assert_eq!(req.headers.get_all(COOKIE).iter().count(), 1);
    }

    #[test]
    fn test_empty_fast_store_leaves_request_alone() {
        let coordinator = CookieCoordinator::new(None, Some(FastCookieStore::new()));
        let mut req = Request::get("https://example.com")
            .unwrap()
            .header("cookie", "caller=9");

        coordinator.inject(&mut req);
        assert_eq!(req.headers.get(COOKIE).unwrap(), "caller=9");
    }

    #[test]
    fn test_extract_skips_standard_jar() {
        let jar = CookieJar::new();
        let fast = FastCookieStore::new();
        let coordinator =
            CookieCoordinator::new(Some(Arc::new(jar.clone())), Some(fast.clone()));

        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("sid=abc; Path=/"));
        coordinator.extract(&headers);

        assert_eq!(fast.cookie_string(), "sid=abc");
        assert!(jar.is_empty());
    }

    #[test]
    fn test_accessors_without_jar() {
        let coordinator = CookieCoordinator::new(None, None);
        let url = Url::parse("https://example.com").unwrap();

        coordinator.set_cookies(&url, vec![Cookie::new("a", "1")]);
        assert!(coordinator.cookies(&url).is_empty());

        coordinator.set_jar(Some(Arc::new(CookieJar::new())));
        coordinator.set_cookies(&url, vec![Cookie::new("a", "1")]);
        assert_eq!(coordinator.cookies(&url).len(), 1);
    }
}
