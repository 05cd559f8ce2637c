// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Redirect-following policy

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::StatusCode;
use url::Url;

/// Maximum hops followed in [`RedirectMode::Follow`]
pub const MAX_REDIRECTS: usize = 10;

/// What a custom redirect function sees for each hop
#[derive(Debug)]
pub struct RedirectAttempt<'a> {
    /// Status of the redirect response
    pub status: StatusCode,
    /// Where the redirect points
    pub next: &'a Url,
    /// URLs already visited, oldest first
    pub previous: &'a [Url],
}

/// Outcome of a custom redirect function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Issue the next request
    Follow,
    /// Return the redirect response as the result
    Stop,
    /// Fail the request with this reason
    Fail(String),
}

/// Caller-supplied redirect decision function
pub type RedirectFn = Arc<dyn Fn(&RedirectAttempt<'_>) -> RedirectDecision + Send + Sync>;

/// Effective redirect behavior
#[derive(Clone)]
pub enum RedirectMode {
    /// Follow automatically up to [`MAX_REDIRECTS`]
    Follow,
    /// Stop at the first redirect without failing
    Stop,
    /// Defer to the custom function
    Custom(RedirectFn),
}

impl RedirectMode {
    /// Decide a single hop
    pub fn decide(&self, attempt: &RedirectAttempt<'_>) -> RedirectDecision {
        match self {
            RedirectMode::Stop => RedirectDecision::Stop,
            RedirectMode::Follow if attempt.previous.len() >= MAX_REDIRECTS => {
                RedirectDecision::Fail(format!("stopped after {} redirects", MAX_REDIRECTS))
            }
            RedirectMode::Follow => RedirectDecision::Follow,
            RedirectMode::Custom(f) => f(attempt),
        }
    }
}

impl fmt::Debug for RedirectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectMode::Follow => f.write_str("Follow"),
            RedirectMode::Stop => f.write_str("Stop"),
            RedirectMode::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Follow flag plus optional custom function
#[derive(Clone, Default)]
pub struct RedirectPolicy {
    follow: bool,
    custom: Option<RedirectFn>,
}

impl RedirectPolicy {
    /// Create a policy
    pub fn new(follow: bool, custom: Option<RedirectFn>) -> Self {
        Self { follow, custom }
    }

    /// Whether redirects are followed at all
    pub fn follow(&self) -> bool {
        self.follow
    }

    /// The tri-state mode derived from the flag and the custom function
    pub fn mode(&self) -> RedirectMode {
        match (self.follow, &self.custom) {
            (false, _) => RedirectMode::Stop,
            (true, Some(f)) => RedirectMode::Custom(Arc::clone(f)),
            (true, None) => RedirectMode::Follow,
        }
    }
}

/// Shared handle between the session and its transports.
///
/// Transports read the mode on every hop, so flipping the policy takes effect
/// without rebuilding the transport.
#[derive(Clone, Default)]
pub struct RedirectControl {
    policy: Arc<RwLock<RedirectPolicy>>,
}

impl RedirectControl {
    /// Create a control from an initial policy
    pub fn new(policy: RedirectPolicy) -> Self {
        Self {
            policy: Arc::new(RwLock::new(policy)),
        }
    }

    /// Change the follow flag, keeping the custom function
    pub fn set_follow(&self, follow: bool) {
        self.policy.write().follow = follow;
    }

    /// Current follow flag
    pub fn follow(&self) -> bool {
        self.policy.read().follow()
    }

    /// Current mode
    pub fn mode(&self) -> RedirectMode {
        self.policy.read().mode()
    }
}

impl fmt::Debug for RedirectControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RedirectControl").field(&self.mode()).finish()
    }
}
