// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request cookie parsing and `Set-Cookie` rendering.

use std::collections::HashMap;
use std::fmt;

use axum::http::{HeaderMap, HeaderValue, header};
use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

// =============================================================================
// CookieJar
// =============================================================================

/// Cookies presented by the client, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: HashMap<String, String>,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every `Cookie` header value.
    ///
    /// When a name repeats, the first occurrence wins. Pairs without `=` are
    /// skipped. A header that is not valid UTF-8 fails the whole parse.
    pub fn parse(values: &[HeaderValue]) -> GateResult<Self> {
        let mut jar = Self::new();

        for value in values {
            let raw = value
                .to_str()
                .map_err(|e| GateError::malformed_cookie(e.to_string()))?;

            for pair in raw.split(';') {
                let Some((name, value)) = pair.trim().split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                jar.cookies
                    .entry(name.to_string())
                    .or_insert_with(|| value.trim().to_string());
            }
        }

        Ok(jar)
    }

    /// Parses the `Cookie` headers of a header map.
    pub fn from_headers(headers: &HeaderMap) -> GateResult<Self> {
        let values: Vec<HeaderValue> = headers.get_all(header::COOKIE).iter().cloned().collect();
        Self::parse(&values)
    }

    /// Adds a cookie unless one with the same name exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Returns a cookie value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Returns `true` if the cookie is present.
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Returns the number of cookies.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns `true` if the jar holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

// =============================================================================
// SetCookie
// =============================================================================

/// `SameSite` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameSite {
    /// `SameSite=Strict`.
    Strict,
    /// `SameSite=Lax`.
    #[default]
    Lax,
    /// `SameSite=None`.
    None,
}

impl SameSite {
    /// Returns the attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// A cookie to be written on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// `Path` attribute.
    pub path: String,
    /// `Max-Age` in seconds.
    pub max_age: Option<i64>,
    /// Whether to add `HttpOnly`.
    pub http_only: bool,
    /// Whether to add `Secure`.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: Option<SameSite>,
}

impl SetCookie {
    /// Creates a cookie scoped to `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            max_age: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    /// Creates a cookie that expires the named cookie immediately.
    pub fn clear(name: impl Into<String>) -> Self {
        Self::new(name, "").with_max_age(0)
    }

    /// Sets `Max-Age`.
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Sets `Path`.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets `SameSite`.
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Marks the cookie `HttpOnly`.
    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    /// Marks the cookie `Secure`.
    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Renders the header value.
    pub fn to_header_value(&self) -> GateResult<HeaderValue> {
        HeaderValue::from_str(&self.to_string())
            .map_err(|e| GateError::internal(format!("Invalid Set-Cookie value: {}", e)))
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; Path={}", self.name, self.value, self.path)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site.as_str())?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_header() {
        let jar = CookieJar::parse(&[HeaderValue::from_static(
            "admin_token=abc; dashboard_token=def ;theme=dark",
        )])
        .unwrap();

        assert_eq!(jar.get("admin_token"), Some("abc"));
        assert_eq!(jar.get("dashboard_token"), Some("def"));
        assert_eq!(jar.get("theme"), Some("dark"));
        assert_eq!(jar.len(), 3);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let jar = CookieJar::parse(&[
            HeaderValue::from_static("admin_token=first"),
            HeaderValue::from_static("admin_token=second; other=1"),
        ])
        .unwrap();

        assert_eq!(jar.get("admin_token"), Some("first"));
        assert_eq!(jar.get("other"), Some("1"));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let jar = CookieJar::parse(&[HeaderValue::from_static("t=a.b=c==")]).unwrap();
        assert_eq!(jar.get("t"), Some("a.b=c=="));
    }

    #[test]
    fn test_skips_bare_words() {
        let jar = CookieJar::parse(&[HeaderValue::from_static("flag; =x; a=1")]).unwrap();
        assert_eq!(jar.len(), 1);
        assert!(jar.contains("a"));
    }

    #[test]
    fn test_opaque_header_is_malformed() {
        let value = HeaderValue::from_bytes(b"admin_token=\xff\xfe").unwrap();
        let result = CookieJar::parse(&[value]);
        assert!(matches!(result, Err(GateError::MalformedCookie { .. })));
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));

        let jar = CookieJar::from_headers(&headers).unwrap();
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("b"), Some("2"));
    }

    #[test]
    fn test_set_cookie_rendering() {
        let cookie = SetCookie::new("redirect_attempt", "true")
            .with_max_age(60)
            .with_same_site(SameSite::Lax);
        assert_eq!(
            cookie.to_string(),
            "redirect_attempt=true; Path=/; Max-Age=60; SameSite=Lax"
        );

        let cleared = SetCookie::clear("redirect_attempt");
        assert_eq!(cleared.to_string(), "redirect_attempt=; Path=/; Max-Age=0");
    }

    #[test]
    fn test_set_cookie_flags() {
        let cookie = SetCookie::new("admin_token", "")
            .with_max_age(0)
            .http_only()
            .secure();
        let value = cookie.to_header_value().unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "admin_token=; Path=/; Max-Age=0; HttpOnly; Secure"
        );
    }
}
