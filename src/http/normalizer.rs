// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Outgoing header framing
//!
//! Transports match header order case-sensitively against the lower-cased
//! field names actually transmitted, so every order list leaving the session
//! is lower-cased here.

use parking_lot::Mutex;
use reqwest::header::HeaderMap;

use super::request::Request;

/// Default headers and the lock that guards applying them
#[derive(Debug, Default)]
pub struct HeaderNormalizer {
    defaults: Mutex<DefaultHeaders>,
}

#[derive(Debug, Default, Clone)]
struct DefaultHeaders {
    headers: HeaderMap,
    order: Vec<String>,
}

impl HeaderNormalizer {
    /// Create a normalizer with the given defaults
    pub fn new(headers: HeaderMap, order: Vec<String>) -> Self {
        Self {
            defaults: Mutex::new(DefaultHeaders { headers, order }),
        }
    }

    /// Normalize a request in place.
    ///
    /// `caller_empty` is whether the caller supplied neither headers nor an
    /// order. Only then are the defaults applied; values already present
    /// (the injected `Cookie`) are kept.
    pub fn normalize(&self, request: &mut Request, caller_empty: bool) {
        let defaults = self.defaults.lock();

        if caller_empty {
            for name in defaults.headers.keys() {
                if request.headers.contains_key(name) {
                    continue;
                }
                for value in defaults.headers.get_all(name) {
                    request.headers.append(name.clone(), value.clone());
                }
            }
            request.header_order = defaults.order.clone();
        }

        request.header_order = all_to_lower(&request.header_order);
    }
}

/// Lower-case every entry, keeping positions
pub fn all_to_lower(list: &[String]) -> Vec<String> {
    list.iter().map(|s| s.to_lowercase()).collect()
}
