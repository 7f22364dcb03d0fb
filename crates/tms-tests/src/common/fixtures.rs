// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Secrets, signed tokens and ready-made gatekeepers.

use tms_gate::{
    AppState, Claims, GateConfig, GateRequest, GateServer, Gatekeeper, JwtConfig, JwtManager,
};

/// Secret for the admin, dashboard and debug cookies.
pub const TOKEN_SECRET: &str = "integration-token-secret-0123456789abcdef";

/// Secret of the session framework.
pub const SESSION_SECRET: &str = "integration-session-secret-0123456789abcdef";

/// A secret nobody configured.
pub const FOREIGN_SECRET: &str = "integration-foreign-secret-0123456789abcdef";

// =============================================================================
// Token Fixtures
// =============================================================================

/// Fixture minting tokens.
pub struct TokenFixtures;

impl TokenFixtures {
    fn manager(secret: &str) -> JwtManager {
        JwtManager::new(JwtConfig::new(secret)).expect("Failed to create JWT manager")
    }

    /// A valid purpose-cookie token.
    pub fn token(subject: &str, role: &str) -> String {
        Self::manager(TOKEN_SECRET)
            .mint(subject, role, Some(&format!("{}@example.com", subject)), None)
            .expect("Failed to mint token")
    }

    /// A valid session-cookie token.
    pub fn session_token(subject: &str, role: &str) -> String {
        Self::manager(SESSION_SECRET)
            .mint(subject, role, None, Some("Session User"))
            .expect("Failed to mint token")
    }

    /// A token signed with a secret the gate does not know.
    pub fn forged(subject: &str, role: &str) -> String {
        Self::manager(FOREIGN_SECRET)
            .mint(subject, role, None, None)
            .expect("Failed to mint token")
    }

    /// A token without an `exp` claim.
    pub fn without_expiry(subject: &str, role: &str) -> String {
        let claims = Claims::builder(subject).role(role).without_expiry().build();
        Self::manager(TOKEN_SECRET)
            .create_token(&claims)
            .expect("Failed to mint token")
    }

    /// A token that expired an hour ago.
    pub fn expired(subject: &str, role: &str) -> String {
        let claims = Claims::builder(subject).role(role).expires_in(-3600).build();
        Self::manager(TOKEN_SECRET)
            .create_token(&claims)
            .expect("Failed to mint token")
    }
}

// =============================================================================
// Gate Fixtures
// =============================================================================

/// Fixture building gatekeepers and servers.
pub struct GateFixtures;

impl GateFixtures {
    /// Default gate configuration with both secrets.
    pub fn config() -> GateConfig {
        GateConfig::new(TOKEN_SECRET).with_session_secret(SESSION_SECRET)
    }

    /// Gatekeeper over [`GateFixtures::config`].
    pub fn gatekeeper() -> Gatekeeper {
        Self::gatekeeper_with(Self::config())
    }

    /// Gatekeeper over a custom configuration.
    pub fn gatekeeper_with(config: GateConfig) -> Gatekeeper {
        Gatekeeper::from_config(&config).expect("Failed to build gatekeeper")
    }

    /// Host server over [`GateFixtures::config`].
    pub fn server() -> GateServer {
        Self::server_with(Self::config())
    }

    /// Host server over a custom configuration.
    pub fn server_with(config: GateConfig) -> GateServer {
        GateServer::new(AppState::from_config(config).expect("Failed to build state"))
    }

    /// A request for `path` carrying `cookies`.
    pub fn request(path: &str, cookies: &[(&str, &str)]) -> GateRequest {
        cookies
            .iter()
            .fold(GateRequest::new(path), |req, (name, value)| req.with_cookie(name, value))
    }
}
