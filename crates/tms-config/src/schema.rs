// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema.
//!
//! List-valued route settings are `Option`s: leaving one out keeps the
//! built-in table of the gate, while an explicit list (even an empty one)
//! replaces it.
//!
//! ```yaml
//! server:
//!   port: 3000
//! auth:
//!   secret: "${JWT_SECRET}"
//!   session_secret: "${NEXTAUTH_SECRET}"
//! routes:
//!   admin: ["/dashboard", "/user", "/courses"]
//! loop_guard:
//!   scope: global
//! logging:
//!   level: info
//! ```

use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

/// Default lifetime of minted tokens.
pub const DEFAULT_TOKEN_EXPIRATION_SECS: i64 = 86_400;

/// Default loop guard cookie.
pub const DEFAULT_LOOP_GUARD_COOKIE: &str = "redirect_attempt";

/// Default loop guard lifetime.
pub const DEFAULT_LOOP_GUARD_MAX_AGE_SECS: i64 = 60;

// =============================================================================
// AppConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Host server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Credential verification settings.
    #[serde(default)]
    pub auth: AuthSection,

    /// Route tables.
    #[serde(default)]
    pub routes: RoutesSection,

    /// Gate matcher.
    #[serde(default)]
    pub matcher: MatcherSection,

    /// Redirect loop guard.
    #[serde(default)]
    pub loop_guard: LoopGuardSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.auth.validate()?;
        self.routes.validate()?;
        self.matcher.validate()?;
        self.loop_guard.validate()?;
        Ok(())
    }
}

// =============================================================================
// Server
// =============================================================================

/// Host server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Graceful shutdown timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Mark cookies written by the server `Secure`.
    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_timeout(),
            shutdown_timeout: default_timeout(),
            secure_cookies: false,
        }
    }
}

impl ServerSection {
    /// Validates the server section.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Credential verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// Secret shared by the admin, dashboard and debug cookies. Required.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// Secret of the session framework. Without it the session cookie is
    /// not accepted.
    #[serde(default)]
    pub session_secret: Option<SecretValue>,

    /// Signing algorithm (`HS256`, `HS384` or `HS512`).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Expected issuer; not checked when unset.
    #[serde(default)]
    pub issuer: Option<String>,

    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,

    /// Lifetime of tokens minted by the `token` command.
    #[serde(default = "default_token_expiration")]
    pub token_expiration_secs: i64,

    /// Cookie names per credential source.
    #[serde(default)]
    pub cookies: CookieNamesSection,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_leeway() -> u64 {
    DEFAULT_LEEWAY_SECS
}

fn default_token_expiration() -> i64 {
    DEFAULT_TOKEN_EXPIRATION_SECS
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            secret: None,
            session_secret: None,
            algorithm: default_algorithm(),
            issuer: None,
            leeway_secs: default_leeway(),
            token_expiration_secs: default_token_expiration(),
            cookies: CookieNamesSection::default(),
        }
    }
}

impl AuthSection {
    /// Validates the auth section.
    ///
    /// The signing secret has no fallback: a missing, empty or unresolved
    /// placeholder value fails here.
    pub fn validate(&self) -> ConfigResult<()> {
        match &self.secret {
            None => return Err(ConfigError::missing_field("auth.secret")),
            Some(secret) => secret.validate("auth.secret")?,
        }
        if let Some(secret) = &self.session_secret {
            secret.validate("auth.session_secret")?;
        }

        if !matches!(
            self.algorithm.to_uppercase().as_str(),
            "HS256" | "HS384" | "HS512"
        ) {
            return Err(ConfigError::validation(
                "auth.algorithm",
                format!("unsupported algorithm '{}', expected HS256, HS384 or HS512", self.algorithm),
            ));
        }

        if self.token_expiration_secs <= 0 {
            return Err(ConfigError::validation(
                "auth.token_expiration_secs",
                "must be greater than zero",
            ));
        }

        self.cookies.validate()
    }
}

/// Cookie names per credential source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CookieNamesSection {
    /// Admin cookie names.
    #[serde(default)]
    pub admin: Option<Vec<String>>,
    /// Dashboard cookie names.
    #[serde(default)]
    pub dashboard: Option<Vec<String>>,
    /// Debug cookie names.
    #[serde(default)]
    pub debug: Option<Vec<String>>,
    /// Session cookie names.
    #[serde(default)]
    pub session: Option<Vec<String>>,
}

impl CookieNamesSection {
    /// Returns `(source, names)` for every overridden source.
    pub fn overrides(&self) -> Vec<(&'static str, &[String])> {
        [
            ("admin", &self.admin),
            ("dashboard", &self.dashboard),
            ("debug", &self.debug),
            ("session", &self.session),
        ]
        .into_iter()
        .filter_map(|(source, names)| names.as_deref().map(|n| (source, n)))
        .collect()
    }

    fn validate(&self) -> ConfigResult<()> {
        for (source, names) in self.overrides() {
            let field = format!("auth.cookies.{}", source);
            if names.is_empty() {
                return Err(ConfigError::validation(field, "at least one cookie name is required"));
            }
            for name in names {
                if name.is_empty() || name.contains(|c: char| c == ';' || c == '=' || c.is_whitespace()) {
                    return Err(ConfigError::validation(
                        field,
                        format!("invalid cookie name '{}'", name),
                    ));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Route tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesSection {
    /// Public prefixes (raw prefix match).
    #[serde(default)]
    pub public: Option<Vec<String>>,

    /// Admin-only prefixes.
    #[serde(default)]
    pub admin: Option<Vec<String>>,

    /// Instructor-only prefixes.
    #[serde(default)]
    pub instructor: Option<Vec<String>>,

    /// Participant-only prefixes.
    #[serde(default)]
    pub participant: Option<Vec<String>>,

    /// Prefixes open to every authenticated role, carved out of the
    /// restricted lists.
    #[serde(default)]
    pub shared: Option<Vec<String>>,

    /// Login page.
    #[serde(default = "default_login_path")]
    pub login: String,

    /// Landing page overrides per role.
    #[serde(default)]
    pub landing: LandingSection,
}

fn default_login_path() -> String {
    "/login".to_string()
}

impl Default for RoutesSection {
    fn default() -> Self {
        Self {
            public: None,
            admin: None,
            instructor: None,
            participant: None,
            shared: None,
            login: default_login_path(),
            landing: LandingSection::default(),
        }
    }
}

impl RoutesSection {
    /// Validates the routes section.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_path("routes.login", &self.login)?;

        for (field, prefixes) in [
            ("routes.public", &self.public),
            ("routes.admin", &self.admin),
            ("routes.instructor", &self.instructor),
            ("routes.participant", &self.participant),
            ("routes.shared", &self.shared),
        ] {
            let Some(prefixes) = prefixes else {
                continue;
            };
            for prefix in prefixes {
                validate_path(field, prefix)?;
            }
            for prefix in duplicates(prefixes) {
                tracing::warn!(field = field, prefix = prefix, "Duplicate route prefix");
            }
        }

        for (role, page) in self.landing.overrides() {
            validate_path(&format!("routes.landing.{}", role), page)?;
        }
        Ok(())
    }
}

/// Landing page overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LandingSection {
    /// Admin landing page.
    #[serde(default)]
    pub admin: Option<String>,
    /// Instructor landing page.
    #[serde(default)]
    pub instructor: Option<String>,
    /// Participant landing page.
    #[serde(default)]
    pub participant: Option<String>,
    /// Landing page for unrecognized roles.
    #[serde(default)]
    pub unknown: Option<String>,
}

impl LandingSection {
    /// Returns `(role, page)` for every overridden role.
    pub fn overrides(&self) -> Vec<(&'static str, &str)> {
        [
            ("admin", &self.admin),
            ("instructor", &self.instructor),
            ("participant", &self.participant),
            ("unknown", &self.unknown),
        ]
        .into_iter()
        .filter_map(|(role, page)| page.as_deref().map(|p| (role, p)))
        .collect()
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Gate matcher rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatcherSection {
    /// Ordered rules; first match wins, default is to gate.
    #[serde(default)]
    pub rules: Option<Vec<MatcherRuleConfig>>,
}

impl MatcherSection {
    /// Validates the matcher section.
    pub fn validate(&self) -> ConfigResult<()> {
        for rule in self.rules.iter().flatten() {
            validate_path("matcher.rules", &rule.prefix)?;
        }
        Ok(())
    }
}

/// One matcher rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatcherRuleConfig {
    /// Path prefix.
    pub prefix: String,
    /// What to do for the prefix.
    #[serde(default)]
    pub action: MatcherAction,
}

/// Matcher action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherAction {
    /// Run the gate.
    Gate,
    /// Skip the gate.
    #[default]
    Skip,
}

// =============================================================================
// Loop Guard
// =============================================================================

/// Redirect loop guard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoopGuardSection {
    /// Whether the guard is active.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Marker cookie name.
    #[serde(default = "default_loop_guard_cookie")]
    pub cookie: String,

    /// Marker lifetime in seconds.
    #[serde(default = "default_loop_guard_max_age")]
    pub max_age_secs: i64,

    /// Which requests a tripped marker admits.
    #[serde(default)]
    pub scope: LoopGuardScopeConfig,
}

fn default_enabled() -> bool {
    true
}

fn default_loop_guard_cookie() -> String {
    DEFAULT_LOOP_GUARD_COOKIE.to_string()
}

fn default_loop_guard_max_age() -> i64 {
    DEFAULT_LOOP_GUARD_MAX_AGE_SECS
}

impl Default for LoopGuardSection {
    fn default() -> Self {
        Self {
            enabled: true,
            cookie: default_loop_guard_cookie(),
            max_age_secs: default_loop_guard_max_age(),
            scope: LoopGuardScopeConfig::default(),
        }
    }
}

impl LoopGuardSection {
    /// Validates the loop guard section.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.cookie.trim().is_empty() {
            return Err(ConfigError::validation("loop_guard.cookie", "must not be empty"));
        }
        if self.max_age_secs <= 0 {
            return Err(ConfigError::validation(
                "loop_guard.max_age_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Loop guard scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopGuardScopeConfig {
    /// A tripped marker admits any path.
    #[default]
    Global,
    /// A tripped marker only admits the path that set it.
    Path,
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include span targets in logs.
    #[serde(default = "default_enabled")]
    pub with_target: bool,

    /// Include file/line in logs.
    #[serde(default)]
    pub with_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            with_target: true,
            with_file: false,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON for log aggregation.
    Json,
}

impl LogFormat {
    /// Parses a format name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret that never shows up in logs, debug output or serialized config.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the value still contains a `${...}` placeholder.
    pub fn is_unresolved(&self) -> bool {
        self.0.contains("${")
    }

    /// Returns `true` if the value is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn validate(&self, field: &str) -> ConfigResult<()> {
        if self.is_blank() {
            return Err(ConfigError::validation(field, "must not be empty"));
        }
        if self.is_unresolved() {
            return Err(ConfigError::validation(
                field,
                "contains an unresolved environment placeholder",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(***)")
    }
}

impl Serialize for SecretValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_path(field: &str, path: &str) -> ConfigResult<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::validation(
            field,
            format!("'{}' must start with '/'", path),
        ));
    }
    Ok(())
}

/// Returns the duplicates in a list, in first-seen order.
pub fn duplicates(items: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut dup = Vec::new();
    for item in items {
        if !seen.insert(item.as_str()) && !dup.contains(&item.as_str()) {
            dup.push(item.as_str());
        }
    }
    dup
}

// =============================================================================
// Tests
// =============================================================================
