// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request types

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::error::Result;

/// HTTP request representation
///
/// `header_order` lists field names in the order the transport must put them
/// on the wire. Names not listed follow in insertion order.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Wire order of header names
    pub header_order: Vec<String>,
    /// Request body
    pub body: Option<Bytes>,
    /// Per-request timeout, overrides the session timeout
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a new POST request
    pub fn post(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: HeaderMap::new(),
            header_order: Vec::new(),
            body: None,
            timeout: None,
        })
    }

    /// Set a header, replacing existing values
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Append a header value, keeping existing values
    pub fn append_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Set the header wire order
    pub fn header_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let json = serde_json::to_vec(data)?;
        self.body = Some(Bytes::from(json));
        Ok(self.header("content-type", "application/json"))
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the host
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Headers rearranged into `header_order` sequence.
    ///
    /// Listed names come first (all their values, in order), unlisted names
    /// follow in their original iteration order. Matching is case-insensitive.
    pub fn ordered_headers(&self) -> HeaderMap {
        let mut ordered = HeaderMap::with_capacity(self.headers.len());

        for name in &self.header_order {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                continue;
            };
            if ordered.contains_key(&name) {
                continue;
            }
            for value in self.headers.get_all(&name) {
                ordered.append(name.clone(), value.clone());
            }
        }

        for name in self.headers.keys() {
            if ordered.contains_key(name) {
                continue;
            }
            for value in self.headers.get_all(name) {
                ordered.append(name.clone(), value.clone());
            }
        }

        ordered
    }
}

/// The request a response answers, as seen after redirects
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// Request method
    pub method: Method,
    /// Final URL (after redirects)
    pub url: Url,
    /// Header order the request was sent with
    pub header_order: Vec<String>,
}

impl From<&Request> for RequestInfo {
    fn from(request: &Request) -> Self {
        Self {
            method: request.method.clone(),
            url: request.url.clone(),
            header_order: request.header_order.clone(),
        }
    }
}
