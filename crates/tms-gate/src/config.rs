// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gate and host server configuration.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::{CredentialSource, JwtConfig};
use crate::error::{GateError, GateResult};
use crate::loop_guard::LoopGuard;
use crate::routes::{LandingPages, RouteMatcher, RouteTable};

// =============================================================================
// ServerConfig
// =============================================================================

/// Host server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: IpAddr,
    /// Bind port.
    pub port: u16,
    /// Request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
    /// Add `Secure` to cookies written by the server.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
            secure_cookies: false,
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// GateConfig
// =============================================================================

/// Everything needed to build a [`Gatekeeper`](crate::Gatekeeper) and host it.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Host server settings.
    pub server: ServerConfig,
    /// Verification settings shared by the admin, dashboard and debug cookies.
    pub jwt: JwtConfig,
    /// Verification settings for the session cookie; `None` disables it.
    pub session: Option<JwtConfig>,
    /// Cookie names per credential source, overriding the defaults.
    pub cookie_names: BTreeMap<CredentialSource, Vec<String>>,
    /// Route classification.
    pub routes: RouteTable,
    /// Landing page per role.
    pub landing: LandingPages,
    /// Which paths invoke the gate.
    pub matcher: RouteMatcher,
    /// Redirect loop guard.
    pub loop_guard: LoopGuard,
}

impl GateConfig {
    /// Creates a configuration with the given purpose-cookie secret and
    /// defaults everywhere else.
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_jwt(JwtConfig::new(secret))
    }

    /// Creates a configuration from token settings.
    pub fn with_jwt(jwt: JwtConfig) -> Self {
        Self {
            server: ServerConfig::default(),
            jwt,
            session: None,
            cookie_names: BTreeMap::new(),
            routes: RouteTable::default(),
            landing: LandingPages::default(),
            matcher: RouteMatcher::default(),
            loop_guard: LoopGuard::default(),
        }
    }

    /// Enables the session cookie with its own secret.
    pub fn with_session_secret(mut self, secret: impl Into<String>) -> Self {
        self.session = Some(JwtConfig::new(secret));
        self
    }

    /// Sets the session verification settings.
    pub fn with_session(mut self, session: JwtConfig) -> Self {
        self.session = Some(session);
        self
    }

    /// Overrides the cookie names of one source.
    pub fn with_cookie_names(mut self, source: CredentialSource, names: Vec<String>) -> Self {
        self.cookie_names.insert(source, names);
        self
    }

    /// Sets the host server settings.
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// Sets the route table.
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Sets the landing pages.
    pub fn with_landing(mut self, landing: LandingPages) -> Self {
        self.landing = landing;
        self
    }

    /// Sets the gate matcher.
    pub fn with_matcher(mut self, matcher: RouteMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Sets the loop guard.
    pub fn with_loop_guard(mut self, loop_guard: LoopGuard) -> Self {
        self.loop_guard = loop_guard;
        self
    }

    /// Returns the cookie names for a source.
    pub fn cookie_names_for(&self, source: CredentialSource) -> Vec<String> {
        self.cookie_names
            .get(&source)
            .cloned()
            .unwrap_or_else(|| source.default_cookie_names())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GateResult<()> {
        self.jwt.validate()?;
        if let Some(session) = &self.session {
            if !session.secret.trim().is_empty() {
                session.validate()?;
            }
        }

        for (source, names) in &self.cookie_names {
            if names.iter().all(|n| n.trim().is_empty()) {
                return Err(GateError::configuration(format!(
                    "no cookie names configured for source '{}'",
                    source
                )));
            }
        }

        if self.loop_guard.is_enabled() && self.loop_guard.cookie().trim().is_empty() {
            return Err(GateError::configuration("loop guard cookie name is empty"));
        }

        self.routes.validate()?;
        self.landing.validate(&self.routes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "gate-config-secret-that-is-long-enough";

    #[test]
    fn test_defaults_validate() {
        let config = GateConfig::new(SECRET);
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert!(config.session.is_none());
    }

    #[test]
    fn test_missing_secret_rejected() {
        let config = GateConfig::new("");
        assert!(matches!(config.validate(), Err(GateError::Configuration { .. })));
    }

    #[test]
    fn test_cookie_name_override() {
        let config = GateConfig::new(SECRET)
            .with_cookie_names(CredentialSource::Admin, vec!["adm".to_string()]);

        assert_eq!(config.cookie_names_for(CredentialSource::Admin), vec!["adm"]);
        assert_eq!(
            config.cookie_names_for(CredentialSource::Debug),
            vec!["debug_token"]
        );
    }

    #[test]
    fn test_blank_cookie_names_rejected() {
        let config =
            GateConfig::new(SECRET).with_cookie_names(CredentialSource::Debug, vec![" ".to_string()]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_server_config_humantime() {
        let server: ServerConfig =
            serde_json::from_str(r#"{"port": 8080, "request_timeout": "5s"}"#).unwrap();
        assert_eq!(server.port, 8080);
        assert_eq!(server.request_timeout, Duration::from_secs(5));
        assert_eq!(server.shutdown_timeout, Duration::from_secs(30));
    }
}
