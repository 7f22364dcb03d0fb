// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tms-config
//!
//! Configuration for the training-management request gate.
//!
//! ## Features
//!
//! - **Schema**: server, auth, route table, matcher, loop guard and logging sections
//! - **Multi-Format Support**: YAML, TOML and JSON files
//! - **Placeholders**: `${VAR}` and `${VAR:default}` inside config files
//! - **Environment Overrides**: `TMS_*` variables override file values
//!
//! ## Quick Start
//!
//! ```no_run
//! use tms_config::load_config;
//!
//! let config = load_config("tms.yaml").unwrap();
//! println!("Listening on port {}", config.server.port);
//! ```
//!
//! Lists left unset (route prefixes, cookie names, landing pages) mean
//! "use the gate's built-in defaults".

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, EnvSource, load_config, load_config_str};
pub use schema::{
    AppConfig, AuthSection, CookieNamesSection, LandingSection, LogFormat, LogLevel,
    LoggingConfig, LoopGuardScopeConfig, LoopGuardSection, MatcherAction, MatcherRuleConfig,
    MatcherSection, RoutesSection, SecretValue, ServerSection,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
