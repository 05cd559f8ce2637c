// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scripted transport for driving a session without a network

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Version};

use seepia::http::{RawResponse, Request, RequestInfo, ResponseHead};
use seepia::transport::{Dialer, RoundTripper, TransportBuilder, TransportSpec};
use seepia::{Error, Result};

/// What a scripted transport does with one request
pub enum Outcome {
    Respond {
        status: u16,
        headers: Vec<(String, String)>,
        chunks: Vec<Result<Bytes>>,
    },
    Fail(Error),
}

impl Outcome {
    pub fn ok(body: &str) -> Self {
        Outcome::Respond {
            status: 200,
            headers: Vec::new(),
            chunks: vec![Ok(Bytes::copy_from_slice(body.as_bytes()))],
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Outcome::Respond { headers, .. } = &mut self {
            headers.push((name.to_string(), value.to_string()));
        }
        self
    }
}

pub type Script = Arc<dyn Fn(&Request) -> Outcome + Send + Sync>;

/// Shared record of everything the transports saw
#[derive(Default)]
pub struct Recorder {
    pub requests: Mutex<Vec<Request>>,
    pub body_drops: AtomicUsize,
}

impl Recorder {
    pub fn last(&self) -> Request {
        self.requests.lock().last().cloned().expect("no request recorded")
    }

    pub fn drops(&self) -> usize {
        self.body_drops.load(Ordering::SeqCst)
    }
}

struct DropCounter(Arc<Recorder>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.body_drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Round-tripper answering from a script. Every response carries an
/// `x-via` header naming the proxy the transport was built for.
pub struct ScriptedTransport {
    via: String,
    script: Script,
    recorder: Arc<Recorder>,
    pub idle_closes: Arc<AtomicUsize>,
}

#[async_trait]
impl RoundTripper for ScriptedTransport {
    async fn round_trip(&self, request: Request) -> Result<RawResponse> {
        tokio::task::yield_now().await;
        let outcome = (self.script)(&request);
        let info = RequestInfo::from(&request);
        self.recorder.requests.lock().push(request);

        match outcome {
            Outcome::Fail(error) => Err(error),
            Outcome::Respond {
                status,
                headers,
                chunks,
            } => {
                let mut map = HeaderMap::new();
                for (name, value) in headers {
                    map.append(
                        HeaderName::from_bytes(name.as_bytes()).expect("header name"),
                        HeaderValue::from_str(&value).expect("header value"),
                    );
                }
                map.insert("x-via", HeaderValue::from_str(&self.via).expect("via"));

                let guard = DropCounter(self.recorder.clone());
                let body = stream::iter(chunks)
                    .map(move |chunk| {
                        let _ = &guard;
                        chunk
                    })
                    .boxed();

                Ok(RawResponse {
                    head: ResponseHead {
                        status: StatusCode::from_u16(status).expect("status"),
                        version: Version::HTTP_11,
                        headers: map,
                        content_length: None,
                        uncompressed: false,
                        trailer: HeaderMap::new(),
                        request: info,
                        tls: None,
                    },
                    body,
                })
            }
        }
    }

    fn close_idle_connections(&self) {
        self.idle_closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Builder producing scripted transports. Proxies listed in `failing`
/// (matched by substring) and, with `fail_direct`, direct routes fail to build.
pub struct ScriptedBuilder {
    script: Script,
    pub recorder: Arc<Recorder>,
    pub failing: Mutex<Vec<String>>,
    pub fail_direct: AtomicBool,
    pub builds: Mutex<Vec<String>>,
    pub idle_closes: Arc<AtomicUsize>,
}

impl ScriptedBuilder {
    pub fn new(script: impl Fn(&Request) -> Outcome + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Arc::new(script),
            recorder: Arc::new(Recorder::default()),
            failing: Mutex::new(Vec::new()),
            fail_direct: AtomicBool::new(false),
            builds: Mutex::new(Vec::new()),
            idle_closes: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(|_| Outcome::ok("ok"))
    }

    pub fn fail_proxy(&self, needle: &str) {
        self.failing.lock().push(needle.to_string());
    }
}

impl TransportBuilder for ScriptedBuilder {
    fn build(&self, spec: &TransportSpec) -> Result<Arc<dyn RoundTripper>> {
        let via = match &spec.dialer {
            Dialer::Direct(_) => {
                if self.fail_direct.load(Ordering::SeqCst) {
                    return Err(Error::transport_build("direct route disabled"));
                }
                String::new()
            }
            Dialer::Connect(connect) => {
                let proxy = connect.proxy.to_string();
                if self.failing.lock().iter().any(|needle| proxy.contains(needle)) {
                    return Err(Error::transport_build(format!("cannot reach {}", proxy)));
                }
                proxy
            }
        };
        self.builds.lock().push(via.clone());

        Ok(Arc::new(ScriptedTransport {
            via,
            script: self.script.clone(),
            recorder: self.recorder.clone(),
            idle_closes: self.idle_closes.clone(),
        }))
    }
}
