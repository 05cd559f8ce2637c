// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types
//!
//! A transport hands back a [`ResponseHead`] and a [`BodyStream`]. The session
//! turns the head into an immutable [`Response`] snapshot, then drains the
//! body into it.

use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONNECTION, TRANSFER_ENCODING};
use reqwest::{StatusCode, Version};
use serde::de::DeserializeOwned;
use url::Url;

use super::request::RequestInfo;
use crate::error::{Error, Result};

/// Response body as produced by a transport
pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// Connection-security metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsInfo {
    /// DER-encoded leaf certificate presented by the peer
    pub peer_certificate: Option<Vec<u8>>,
}

/// Everything a transport knows about a response before its body is read
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    /// Declared body length, if known
    pub content_length: Option<u64>,
    /// The transport decompressed the body on its own
    pub uncompressed: bool,
    pub trailer: HeaderMap,
    pub request: RequestInfo,
    pub tls: Option<TlsInfo>,
}

/// Raw transport response: head plus undrained body
pub struct RawResponse {
    pub head: ResponseHead,
    pub body: BodyStream,
}

/// Materialized HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    /// Status line text, e.g. `200 OK`
    pub status: String,
    /// Status code, `-1` when no response was received
    pub status_code: i32,
    /// Protocol name, e.g. `HTTP/1.1`
    pub proto: String,
    pub proto_major: u8,
    pub proto_minor: u8,
    /// Response headers, duplicates preserved
    pub headers: HeaderMap,
    /// Body length, `-1` when unknown
    pub content_length: i64,
    /// Transfer codings, outermost last
    pub transfer_encoding: Vec<String>,
    /// The server asked to close the connection
    pub close: bool,
    /// The transport decompressed the body
    pub uncompressed: bool,
    pub trailer: HeaderMap,
    /// The request that produced this response (after redirects)
    pub request: Option<RequestInfo>,
    pub tls: Option<TlsInfo>,
    /// Raw body bytes, unset until the body is drained
    pub body_bytes: Option<Bytes>,
    /// Body as text, unset until drained and for non-UTF-8 payloads
    pub body: Option<String>,
}

impl Response {
    /// The sentinel returned when no response arrived
    pub fn failed() -> Self {
        Self {
            status: String::new(),
            status_code: -1,
            proto: String::new(),
            proto_major: 0,
            proto_minor: 0,
            headers: HeaderMap::new(),
            content_length: -1,
            transfer_encoding: Vec::new(),
            close: false,
            uncompressed: false,
            trailer: HeaderMap::new(),
            request: None,
            tls: None,
            body_bytes: None,
            body: None,
        }
    }

    /// Snapshot a response head. The head is left untouched.
    pub fn snapshot(head: &ResponseHead) -> Self {
        let (proto, proto_major, proto_minor) = protocol(head.version);

        Self {
            status: status_line(head.status),
            status_code: i32::from(head.status.as_u16()),
            proto: proto.to_string(),
            proto_major,
            proto_minor,
            headers: head.headers.clone(),
            content_length: head
                .content_length
                .and_then(|len| i64::try_from(len).ok())
                .unwrap_or(-1),
            transfer_encoding: transfer_codings(&head.headers),
            close: wants_close(head.version, &head.headers),
            uncompressed: head.uncompressed,
            trailer: head.trailer.clone(),
            request: Some(head.request.clone()),
            tls: head.tls.clone(),
            body_bytes: None,
            body: None,
        }
    }

    /// Store a drained body. `body` is only set for UTF-8 payloads so its
    /// byte length always equals `body_bytes`.
    pub(crate) fn set_body(&mut self, bytes: Bytes) {
        self.body = std::str::from_utf8(&bytes).ok().map(str::to_owned);
        self.body_bytes = Some(bytes);
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    /// Body text, empty when unset or not UTF-8
    pub fn text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = self
            .body_bytes
            .as_ref()
            .ok_or_else(|| Error::other("response has no body"))?;
        serde_json::from_slice(bytes).map_err(Error::from)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all("set-cookie")
    }

    /// Final URL, if a response was received
    pub fn url(&self) -> Option<&Url> {
        self.request.as_ref().map(|r| &r.url)
    }
}

/// Read a body stream to the end.
///
/// The stream is consumed by value and dropped when this returns, whether the
/// read finished or failed part-way.
pub async fn drain_body(mut body: BodyStream) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(chunk) => buf.extend_from_slice(&chunk),
            Err(Error::BodyRead(msg)) => return Err(Error::BodyRead(msg)),
            Err(e) => return Err(Error::body_read(e.to_string())),
        }
    }
    Ok(buf.freeze())
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_str(), reason),
        None => status.as_str().to_string(),
    }
}

fn protocol(version: Version) -> (&'static str, u8, u8) {
    match version {
        Version::HTTP_09 => ("HTTP/0.9", 0, 9),
        Version::HTTP_10 => ("HTTP/1.0", 1, 0),
        Version::HTTP_2 => ("HTTP/2.0", 2, 0),
        Version::HTTP_3 => ("HTTP/3.0", 3, 0),
        _ => ("HTTP/1.1", 1, 1),
    }
}

fn transfer_codings(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(TRANSFER_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

fn wants_close(version: Version, headers: &HeaderMap) -> bool {
    let tokens: Vec<String> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|t| t.trim().to_lowercase())
        .collect();

    if tokens.iter().any(|t| t == "close") {
        return true;
    }
    version == Version::HTTP_10 && !tokens.iter().any(|t| t == "keep-alive")
}
