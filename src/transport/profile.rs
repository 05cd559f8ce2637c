// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Client fingerprint profiles
//!
//! A profile is an opaque descriptor handed to the transport builder. The
//! session never interprets it beyond passing it along on every rebuild.

use serde::{Deserialize, Serialize};

/// Connection-level characteristics a transport should emulate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    /// Profile identifier, e.g. `chrome_131`
    pub name: String,
    /// User-Agent sent when the request does not set one
    pub user_agent: Option<String>,
    /// ALPN protocols in preference order
    pub alpn: Vec<String>,
}

impl ClientProfile {
    /// Chrome 131 on macOS
    pub fn chrome_131() -> Self {
        Self {
            name: "chrome_131".to_string(),
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            alpn: vec!["h2".to_string(), "http/1.1".to_string()],
        }
    }

    /// Firefox 133 on macOS
    pub fn firefox_133() -> Self {
        Self {
            name: "firefox_133".to_string(),
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0"
                    .to_string(),
            ),
            alpn: vec!["h2".to_string(), "http/1.1".to_string()],
        }
    }

    /// Whether the profile negotiates HTTP/2
    pub fn supports_http2(&self) -> bool {
        self.alpn.iter().any(|p| p == "h2")
    }

    /// Look up a built-in profile by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "chrome_131" | "chrome" => Some(Self::chrome_131()),
            "firefox_133" | "firefox" => Some(Self::firefox_133()),
            _ => None,
        }
    }
}

impl Default for ClientProfile {
    fn default() -> Self {
        default_profile()
    }
}

/// The profile used when none is configured
pub fn default_profile() -> ClientProfile {
    ClientProfile::chrome_131()
}
