// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gate runtime orchestration.
//!
//! - Configuration loading and validation
//! - Bridging the file schema into [`GateConfig`]
//! - Server startup and graceful shutdown

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use tms_config::{AppConfig, ConfigLoader, LoopGuardScopeConfig, MatcherAction};
use tms_gate::{
    AppState, CredentialSource, GateConfig, GateServer, JwtConfig, LandingPages, LoopGuard,
    LoopGuardScope, MatcherRule, Role, RouteMatcher, RouteTable, ServerConfig,
    routes::{
        DEFAULT_ADMIN_PREFIXES, DEFAULT_INSTRUCTOR_PREFIXES, DEFAULT_PARTICIPANT_PREFIXES,
        DEFAULT_PUBLIC_PREFIXES, DEFAULT_SHARED_PREFIXES,
    },
};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// Config Loading
// =============================================================================

/// Loads the file configuration, or builds it from the environment alone
/// when no file is given.
pub fn load_app_config(path: Option<&Path>) -> BinResult<AppConfig> {
    let loader = ConfigLoader::new();
    let config = match path {
        Some(path) => loader.load(path).map_err(|e| {
            BinError::from(e).with_context(format!("loading {}", path.display()))
        })?,
        None => loader.load_defaults()?,
    };
    Ok(config)
}

// =============================================================================
// Config Bridge
// =============================================================================

/// Converts the file schema into gate settings.
///
/// Lists left unset in the file keep the gate's built-in defaults; a list
/// that is set replaces the default for that role or source.
pub fn gate_config(app: &AppConfig) -> BinResult<GateConfig> {
    let secret = app
        .auth
        .secret
        .as_ref()
        .ok_or_else(|| BinError::config("auth.secret is required"))?;

    let algorithm = jsonwebtoken_algorithm(&app.auth.algorithm)?;
    let jwt = token_settings(JwtConfig::new(secret.expose()), app, algorithm);

    let mut config = GateConfig::with_jwt(jwt).with_server(ServerConfig {
        host: app.server.host,
        port: app.server.port,
        request_timeout: app.server.request_timeout,
        shutdown_timeout: app.server.shutdown_timeout,
        secure_cookies: app.server.secure_cookies,
    });

    if let Some(session_secret) = &app.auth.session_secret {
        config = config.with_session(token_settings(
            JwtConfig::new(session_secret.expose()),
            app,
            algorithm,
        ));
    }

    for (source, names) in app.auth.cookies.overrides() {
        let source = CredentialSource::parse(source)
            .ok_or_else(|| BinError::config(format!("unknown credential source '{}'", source)))?;
        config = config.with_cookie_names(source, names.to_vec());
    }

    Ok(config
        .with_routes(route_table(app))
        .with_landing(landing_pages(app))
        .with_matcher(route_matcher(app))
        .with_loop_guard(loop_guard(app)))
}

fn jsonwebtoken_algorithm(name: &str) -> BinResult<tms_gate::auth::Algorithm> {
    tms_gate::auth::Algorithm::from_str(&name.to_uppercase())
        .map_err(|e| BinError::config(format!("auth.algorithm '{}': {}", name, e)))
}

fn token_settings(
    mut jwt: JwtConfig,
    app: &AppConfig,
    algorithm: tms_gate::auth::Algorithm,
) -> JwtConfig {
    jwt.algorithm = algorithm;
    jwt.leeway_secs = app.auth.leeway_secs;
    jwt.expiration_secs = app.auth.token_expiration_secs;
    if let Some(issuer) = &app.auth.issuer {
        jwt = jwt.with_issuer(issuer);
    }
    jwt
}

fn route_table(app: &AppConfig) -> RouteTable {
    let routes = &app.routes;
    let list = |configured: &Option<Vec<String>>, defaults: &[&str]| -> Vec<String> {
        match configured {
            Some(prefixes) => prefixes.clone(),
            None => defaults.iter().map(|p| p.to_string()).collect(),
        }
    };

    RouteTable::new()
        .with_public_prefixes(list(&routes.public, DEFAULT_PUBLIC_PREFIXES))
        .with_restricted(Role::Admin, list(&routes.admin, DEFAULT_ADMIN_PREFIXES))
        .with_restricted(Role::Instructor, list(&routes.instructor, DEFAULT_INSTRUCTOR_PREFIXES))
        .with_restricted(Role::Participant, list(&routes.participant, DEFAULT_PARTICIPANT_PREFIXES))
        .with_shared(list(&routes.shared, DEFAULT_SHARED_PREFIXES))
}

fn landing_pages(app: &AppConfig) -> LandingPages {
    let mut landing = LandingPages::default().with_login(&app.routes.login);
    for (role, page) in app.routes.landing.overrides() {
        landing = landing.with_page(Role::from_label(role), page);
    }
    landing
}

fn route_matcher(app: &AppConfig) -> RouteMatcher {
    match &app.matcher.rules {
        Some(rules) => RouteMatcher::new(
            rules
                .iter()
                .map(|rule| match rule.action {
                    MatcherAction::Gate => MatcherRule::gate(&rule.prefix),
                    MatcherAction::Skip => MatcherRule::skip(&rule.prefix),
                })
                .collect(),
        ),
        None => RouteMatcher::default(),
    }
}

fn loop_guard(app: &AppConfig) -> LoopGuard {
    let section = &app.loop_guard;
    let guard = if section.enabled {
        LoopGuard::new()
    } else {
        LoopGuard::disabled()
    };

    guard
        .with_cookie(&section.cookie)
        .with_max_age(section.max_age_secs)
        .with_scope(match section.scope {
            LoopGuardScopeConfig::Global => LoopGuardScope::Global,
            LoopGuardScopeConfig::Path => LoopGuardScope::Path,
        })
}

// =============================================================================
// GateRuntime
// =============================================================================

/// Runs the gate server until shutdown is signaled.
pub struct GateRuntime {
    config: Arc<GateConfig>,
    shutdown: ShutdownCoordinator,
}

impl GateRuntime {
    /// Creates a runtime around prepared gate settings.
    pub fn new(config: GateConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the gate settings.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Starts the server and blocks until it stops.
    pub async fn run(self) -> BinResult<()> {
        info!(version = tms_gate::VERSION, "Starting TMS gate");

        let state = AppState::from_config(self.config.as_ref().clone())
            .map_err(|e| BinError::from(e).with_context("building gatekeeper"))?;
        let server = GateServer::new(state);
        let grace = self.config.server.shutdown_timeout;

        let signals = self.shutdown.clone();
        tokio::spawn(async move { signals.wait_for_shutdown().await });

        let serving = server.run_with_shutdown(self.shutdown.shutdown_signal());
        tokio::pin!(serving);

        let result = tokio::select! {
            result = &mut serving => result,
            _ = self.shutdown.shutdown_signal() => {
                match tokio::time::timeout(grace, &mut serving).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(timeout = ?grace, "Graceful shutdown timed out, dropping connections");
                        Ok(())
                    }
                }
            }
        };

        result.map_err(|e| BinError::from(e).with_context("serving"))?;
        info!("TMS gate shutdown complete");
        Ok(())
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for [`GateRuntime`].
#[derive(Debug, Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<AppConfig>,
    host: Option<IpAddr>,
    port: Option<u16>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: Option<impl AsRef<Path>>) -> Self {
        self.config_path = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the bind address.
    pub fn host(mut self, host: Option<IpAddr>) -> Self {
        self.host = host;
        self
    }

    /// Overrides the bind port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<GateRuntime> {
        let mut app = match self.config {
            Some(config) => config,
            None => load_app_config(self.config_path.as_deref())?,
        };

        if let Some(host) = self.host {
            app.server.host = host;
        }
        if let Some(port) = self.port {
            app.server.port = port;
        }

        let config = gate_config(&app)?;
        config.validate()?;
        Ok(GateRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tms_config::{LandingSection, MatcherRuleConfig, SecretValue};

    const SECRET: &str = "runtime-test-secret-0123456789abcdef";

    fn app_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.secret = Some(SecretValue::new(SECRET));
        config
    }

    #[test]
    fn test_bridge_defaults() {
        let config = gate_config(&app_config()).unwrap();

        assert_eq!(config.jwt.secret, SECRET);
        assert!(config.session.is_none());
        assert_eq!(config.routes, RouteTable::default());
        assert_eq!(config.landing.login(), "/login");
        assert_eq!(config.loop_guard, LoopGuard::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bridge_overrides() {
        let mut app = app_config();
        app.auth.session_secret = Some(SecretValue::new("session-secret-0123456789abcdef"));
        app.auth.issuer = Some("tms".to_string());
        app.auth.cookies.session = Some(vec!["sid".to_string()]);
        app.routes.admin = Some(vec!["/back-office".to_string()]);
        app.routes.landing = LandingSection {
            admin: Some("/back-office".to_string()),
            ..Default::default()
        };
        app.matcher.rules = Some(vec![MatcherRuleConfig {
            prefix: "/static".to_string(),
            action: MatcherAction::Skip,
        }]);
        app.loop_guard.scope = LoopGuardScopeConfig::Path;

        let config = gate_config(&app).unwrap();

        assert_eq!(config.jwt.issuer.as_deref(), Some("tms"));
        assert_eq!(config.session.as_ref().unwrap().issuer.as_deref(), Some("tms"));
        assert_eq!(config.cookie_names_for(CredentialSource::Session), vec!["sid"]);
        assert!(config.routes.permits(Role::Admin, "/back-office/users"));
        assert!(!config.routes.permits(Role::Instructor, "/back-office"));
        assert!(config.routes.permits(Role::Instructor, "/dashboard"));
        assert!(config.routes.permits(Role::Unknown, "/dashboard-static"));
        assert_eq!(config.landing.for_role(Role::Admin), "/back-office");
        assert!(!config.matcher.should_gate("/static/app.js"));
        assert_eq!(config.loop_guard.scope(), LoopGuardScope::Path);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bridge_requires_secret() {
        let err = gate_config(&AppConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_bridge_algorithm() {
        let mut app = app_config();
        app.auth.algorithm = "hs512".to_string();
        let config = gate_config(&app).unwrap();
        assert_eq!(config.jwt.algorithm, tms_gate::auth::Algorithm::HS512);
    }

    #[test]
    fn test_disabled_loop_guard() {
        let mut app = app_config();
        app.loop_guard.enabled = false;
        let config = gate_config(&app).unwrap();
        assert!(!config.loop_guard.is_enabled());
    }

    #[test]
    fn test_runtime_builder() {
        let runtime = RuntimeBuilder::new()
            .config(app_config())
            .port(Some(0))
            .build()
            .unwrap();

        assert_eq!(runtime.config().server.port, 0);
    }

    #[test]
    fn test_runtime_builder_missing_file() {
        let result = RuntimeBuilder::new()
            .config_path(Some("/nonexistent/tms.yaml"))
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_runtime_stops_on_shutdown() {
        let runtime = RuntimeBuilder::new()
            .config(app_config())
            .host(Some("127.0.0.1".parse().unwrap()))
            .port(Some(0))
            .build()
            .unwrap();
        let shutdown = runtime.shutdown().clone();

        let handle = tokio::spawn(runtime.run());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown.initiate_shutdown();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("runtime should stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
