// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! # Loading Pipeline
//!
//! 1. Read the file (YAML, TOML or JSON, chosen by extension)
//! 2. Substitute `${VAR}` / `${VAR:default}` placeholders
//! 3. Parse into [`AppConfig`]
//! 4. Apply `TMS_*` environment overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! TMS_AUTH_SECRET=...
//! TMS_AUTH_SESSION_SECRET=...
//! TMS_SERVER_PORT=8080
//! TMS_LOG_LEVEL=debug
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{AppConfig, LogFormat, LogLevel, LoopGuardScopeConfig, SecretValue};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "TMS";

// =============================================================================
// EnvSource
// =============================================================================

/// Where environment variables are read from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The process environment.
    #[default]
    Process,
    /// A fixed map, for tests and embedding.
    Map(HashMap<String, String>),
}

impl EnvSource {
    /// Creates a map source from pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvSource::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Looks up a variable.
    pub fn var(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => env::var(name).ok(),
            EnvSource::Map(map) => map.get(name).cloned(),
        }
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader.
///
/// # Examples
///
/// ```no_run
/// use tms_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("tms.yaml").unwrap();
/// println!("port: {}", config.server.port);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    resolve_env_vars: bool,
    env: EnvSource,
}

impl ConfigLoader {
    /// Creates a loader reading the process environment.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            env: EnvSource::Process,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholders and overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Sets the environment source.
    pub fn with_env_source(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format is chosen by extension: `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config: AppConfig = self.parse_content(&content, format, path)?;

        self.finish(&mut config)?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<AppConfig> {
        let content = self.substitute(content)?;
        let mut config: AppConfig = parse_str(&content, format)?;

        self.finish(&mut config)?;
        Ok(config)
    }

    /// Builds configuration from defaults and the environment alone.
    pub fn load_defaults(&self) -> ConfigResult<AppConfig> {
        let mut config = AppConfig::default();
        self.finish(&mut config)?;
        Ok(config)
    }

    fn finish(&self, config: &mut AppConfig) -> ConfigResult<()> {
        if self.resolve_env_vars {
            self.apply_env_overrides(config)?;
        }
        config.validate()?;

        debug!(
            port = config.server.port,
            session_cookie = config.auth.session_secret.is_some(),
            loop_guard = ?config.loop_guard.scope,
            "Configuration validated"
        );
        Ok(())
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content<T: DeserializeOwned>(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<T> {
        let content = self.substitute(content)?;

        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    fn substitute(&self, content: &str) -> ConfigResult<String> {
        if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            Ok(content.to_string())
        }
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// A variable that is unset and has no default is left in place; the
    /// validator rejects it if it ends up in a secret.
    fn resolve_env_placeholders(&self, content: &str) -> ConfigResult<String> {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (self.env.var(var_name), default_value) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!(variable = var_name, "Environment variable not found");
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        Ok(result)
    }

    fn var(&self, suffix: &str) -> (String, Option<String>) {
        let name = format!("{}_{}", self.env_prefix, suffix);
        let value = self.env.var(&name);
        (name, value)
    }

    fn apply_env_overrides(&self, config: &mut AppConfig) -> ConfigResult<()> {
        if let (name, Some(value)) = self.var("SERVER_HOST") {
            config.server.host = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected an IP address"))?;
        }
        if let (name, Some(value)) = self.var("SERVER_PORT") {
            config.server.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
        }
        if let (_, Some(value)) = self.var("SECURE_COOKIES") {
            config.server.secure_cookies = parse_bool(&value);
        }

        if let (_, Some(value)) = self.var("AUTH_SECRET") {
            config.auth.secret = Some(SecretValue::new(value));
        }
        if let (_, Some(value)) = self.var("AUTH_SESSION_SECRET") {
            config.auth.session_secret = Some(SecretValue::new(value));
        }
        if let (_, Some(value)) = self.var("AUTH_ISSUER") {
            config.auth.issuer = Some(value);
        }

        if let (name, Some(value)) = self.var("LOOP_GUARD_SCOPE") {
            config.loop_guard.scope = match value.to_lowercase().as_str() {
                "global" => LoopGuardScopeConfig::Global,
                "path" => LoopGuardScopeConfig::Path,
                _ => return Err(ConfigError::invalid_env_var(name, "expected 'global' or 'path'")),
            };
        }
        if let (_, Some(value)) = self.var("LOOP_GUARD_ENABLED") {
            config.loop_guard.enabled = parse_bool(&value);
        }

        if let (name, Some(value)) = self.var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected trace, debug, info, warn or error"))?;
        }
        if let (name, Some(value)) = self.var("LOG_FORMAT") {
            config.logging.format = LogFormat::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected text, compact or json"))?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with default settings.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<AppConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================
