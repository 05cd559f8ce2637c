// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Seepia - Fingerprint HTTP Session Runtime
//!
//! A long-lived HTTP session whose transport can be rebuilt at runtime
//! (proxy rotation) without disturbing its cookies, default headers or
//! redirect policy.
//!
//! ## Features
//!
//! - Hot-swappable proxy transport with rollback on failure
//! - Header order preserved and lower-cased on every request
//! - Fast cookie store merged atomically from `Set-Cookie` headers
//! - Runtime redirect policy switch, no transport rebuild
//! - Certificate pinning per host
//! - Pluggable [`transport::TransportBuilder`] seam
//!
//! ## Example
//!
//! ```rust,no_run
//! use seepia::{Request, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::with_defaults().await?;
//!
//!     let request = Request::get("https://example.com")?
//!         .header("User-Agent", "Mozilla/5.0")
//!         .header("Accept", "*/*")
//!         .header_order(["User-Agent", "Accept"]);
//!     let response = session.execute(request).await?;
//!     println!("{} {}", response.status, response.text());
//!
//!     session.set_proxy("http://127.0.0.1:8080").await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod session;
pub mod transport;

// Re-exports for convenience

// Errors
pub use error::{Error, ExecuteError, Result};

// HTTP values
pub use http::{
    Cookie, CookieJar, CookieStore, FastCookieStore, RedirectAttempt, RedirectDecision,
    RedirectFn, Request, Response,
};

// Session
pub use session::{default_options, Session, SessionConfig, SessionOption};

// Transport
pub use transport::{
    ClientProfile, DialerSettings, ReqwestTransportBuilder, RoundTripper, TransportBuilder,
    TransportOptions, TransportSpec,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
