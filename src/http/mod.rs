// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP value types for the session runtime
//!
//! Requests, response snapshots, the two cookie stores, header framing and
//! redirect policy. Nothing in here performs I/O.

mod cookie;
mod fast_cookie;
mod normalizer;
mod redirect;
mod request;
mod response;

pub use cookie::{Cookie, CookieJar, CookieStore};
pub use fast_cookie::FastCookieStore;
pub use normalizer::{all_to_lower, HeaderNormalizer};
pub use redirect::{
    RedirectAttempt, RedirectControl, RedirectDecision, RedirectFn, RedirectMode,
    RedirectPolicy, MAX_REDIRECTS,
};
pub use request::{Request, RequestInfo};
pub use response::{drain_body, BodyStream, RawResponse, Response, ResponseHead, TlsInfo};

