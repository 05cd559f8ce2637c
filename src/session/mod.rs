// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session API
//!
//! Configuration, cookie coordination and the [`Session`] handle itself.

mod config;
mod cookies;
mod session;

pub use config::{default_options, SessionConfig, SessionOption, DEFAULT_TIMEOUT_SECS};
pub use session::Session;
