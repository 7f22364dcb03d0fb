// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Redirect loop guard.
//!
//! Every redirect to login arms a short-lived marker cookie. If the next
//! request still carries it, the gate lets that request through and clears
//! the marker instead of redirecting again. In [`LoopGuardScope::Global`] a
//! tripped marker admits *any* path for the lifetime of the cookie; this
//! trades strictness for availability. [`LoopGuardScope::Path`] only admits
//! the path that caused the redirect.

use serde::{Deserialize, Serialize};

use crate::cookies::{CookieJar, SameSite, SetCookie};

/// Default marker cookie name.
pub const DEFAULT_COOKIE: &str = "redirect_attempt";

/// Default marker lifetime in seconds.
pub const DEFAULT_MAX_AGE_SECS: i64 = 60;

/// Which requests a tripped marker admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopGuardScope {
    /// Any truthy marker admits any path.
    #[default]
    Global,
    /// The marker holds a path and only admits that path.
    Path,
}

/// Loop guard settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopGuard {
    enabled: bool,
    cookie: String,
    max_age: i64,
    scope: LoopGuardScope,
}

impl Default for LoopGuard {
    fn default() -> Self {
        Self {
            enabled: true,
            cookie: DEFAULT_COOKIE.to_string(),
            max_age: DEFAULT_MAX_AGE_SECS,
            scope: LoopGuardScope::Global,
        }
    }
}

impl LoopGuard {
    /// Creates a guard with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a guard that never arms nor trips.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the cookie name.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = cookie.into();
        self
    }

    /// Sets the marker lifetime.
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    /// Sets the scope.
    pub fn with_scope(mut self, scope: LoopGuardScope) -> Self {
        self.scope = scope;
        self
    }

    /// Returns `true` if the guard is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the cookie name.
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Returns the scope.
    pub fn scope(&self) -> LoopGuardScope {
        self.scope
    }

    /// Returns the marker to set alongside a redirect from `path`, if any.
    pub fn arm(&self, path: &str) -> Option<SetCookie> {
        if !self.enabled {
            return None;
        }
        let value = match self.scope {
            LoopGuardScope::Global => "true".to_string(),
            LoopGuardScope::Path => encode_marker(path),
        };
        Some(
            SetCookie::new(&self.cookie, value)
                .with_max_age(self.max_age)
                .with_same_site(SameSite::Lax),
        )
    }

    /// Returns the cookie that removes the marker.
    pub fn clear(&self) -> SetCookie {
        SetCookie::clear(&self.cookie)
    }

    /// Returns `true` if the marker admits a request for `path`.
    pub fn is_tripped(&self, jar: &CookieJar, path: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(value) = jar.get(&self.cookie) else {
            return false;
        };
        match self.scope {
            LoopGuardScope::Global => is_truthy(value),
            LoopGuardScope::Path => {
                !value.is_empty() && decode_marker(value).is_some_and(|marked| marked == path)
            }
        }
    }
}

/// Percent-encodes every byte outside the RFC 6265 `cookie-octet` set, and
/// `%` itself, so a path can never end the value or add attributes.
fn encode_marker(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        let safe = matches!(byte, 0x21 | 0x23..=0x24 | 0x26..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E);
        if safe {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

/// Reverses [`encode_marker`]. `None` for a broken escape or non-UTF-8 result.
fn decode_marker(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = value.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.eq_ignore_ascii_case("false") && value != "0"
}
