// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::GateConfig;
use crate::error::GateResult;
use crate::gatekeeper::Gatekeeper;

/// State handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Gate configuration.
    pub config: Arc<GateConfig>,
    /// The gatekeeper, also used by the session endpoints.
    pub gatekeeper: Gatekeeper,
}

impl AppState {
    /// Creates state from parts.
    pub fn new(config: GateConfig, gatekeeper: Gatekeeper) -> Self {
        Self {
            config: Arc::new(config),
            gatekeeper,
        }
    }

    /// Builds the gatekeeper from `config` and wraps both.
    pub fn from_config(config: GateConfig) -> GateResult<Self> {
        let gatekeeper = Gatekeeper::from_config(&config)?;
        Ok(Self::new(config, gatekeeper))
    }

    /// Returns the gatekeeper.
    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gatekeeper
    }
}

impl FromRef<AppState> for Gatekeeper {
    fn from_ref(state: &AppState) -> Self {
        state.gatekeeper.clone()
    }
}

impl FromRef<AppState> for Arc<GateConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let state = AppState::from_config(GateConfig::new("state-test-secret-0123456789abcdef")).unwrap();
        let config: Arc<GateConfig> = FromRef::from_ref(&state);

        assert_eq!(config.server.port, 3000);
        assert_eq!(state.gatekeeper().resolver().slots().len(), 3);
    }

    #[test]
    fn test_from_config_fails_without_secret() {
        assert!(AppState::from_config(GateConfig::new("")).is_err());
    }
}
