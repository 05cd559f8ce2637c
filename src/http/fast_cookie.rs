// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Flat cookie store sent verbatim as the `Cookie` header
//!
//! Unlike [`CookieJar`](super::CookieJar) there is no domain or path scoping:
//! the session owns exactly one cookie string and every request carries it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::header::{HeaderMap, SET_COOKIE};

/// Thread-safe flat cookie store. Clones share the same storage.
#[derive(Clone, Default)]
pub struct FastCookieStore {
    /// name/value pairs in first-seen order
    pairs: Arc<Mutex<Vec<(String, String)>>>,
}

impl FastCookieStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from a raw `Cookie` header string
    pub fn from_header(raw: &str) -> Self {
        let store = Self::new();
        store.set_cookie_string(raw);
        store
    }

    /// The outgoing `Cookie` header value, `name=value; name=value`
    pub fn cookie_string(&self) -> String {
        serialize(&self.pairs.lock())
    }

    /// Replace the whole store with a raw `Cookie` header string
    pub fn set_cookie_string(&self, raw: &str) {
        let mut pairs = Vec::new();
        for pair in raw.split(';') {
            if let Some((name, value)) = split_pair(pair) {
                upsert(&mut pairs, name, value);
            }
        }
        *self.pairs.lock() = pairs;
    }

    /// Value of a single cookie
    pub fn get(&self, name: &str) -> Option<String> {
        self.pairs
            .lock()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Set a single cookie, replacing an existing value of the same name
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        upsert(&mut self.pairs.lock(), name.into(), value.into());
    }

    /// Merge every `Set-Cookie` header into the store.
    ///
    /// The whole merge happens under one lock so concurrent responses never
    /// lose each other's updates. Later headers win over earlier ones.
    pub fn process_set_cookies(&self, headers: &HeaderMap) -> usize {
        let updates: Vec<(String, String)> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(parse_set_cookie)
            .collect();

        if updates.is_empty() {
            return 0;
        }

        let count = updates.len();
        let mut pairs = self.pairs.lock();
        for (name, value) in updates {
            upsert(&mut pairs, name, value);
        }
        count
    }

    /// Remove every cookie
    pub fn clear(&self) {
        self.pairs.lock().clear();
    }

    /// Number of cookies held
    pub fn len(&self) -> usize {
        self.pairs.lock().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.pairs.lock().is_empty()
    }
}

impl fmt::Debug for FastCookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastCookieStore")
            .field("cookies", &self.len())
            .finish()
    }
}

fn split_pair(pair: &str) -> Option<(String, String)> {
    let (name, value) = pair.trim().split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Name and value of a `Set-Cookie` header; attributes are ignored
fn parse_set_cookie(header: &str) -> Option<(String, String)> {
    split_pair(header.split(';').next()?)
}

fn upsert(pairs: &mut Vec<(String, String)>, name: String, value: String) {
    match pairs.iter_mut().find(|(n, _)| *n == name) {
        Some(slot) => slot.1 = value,
        None => pairs.push((name, value)),
    }
}

fn serialize(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(n, v)| format!("{}={}", n, v))
        .collect::<Vec<_>>()
        .join("; ")
}
