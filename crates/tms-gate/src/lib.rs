// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tms-gate
//!
//! Request gatekeeper for the training-management web application.
//!
//! Every non-public request is checked for a signed credential in one of
//! several cookies, the resolved principal's role is matched against the
//! route table, and the request is either forwarded or redirected. The
//! crate also hosts the gate in a small axum server with session and logout
//! endpoints.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extractors;
pub mod gatekeeper;
pub mod handlers;
pub mod loop_guard;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{
    Claims, ClaimsDecoder, Credential, CredentialError, CredentialResolver, CredentialSource,
    JwtConfig, JwtManager, Principal, Role, SessionDecoder,
};
pub use config::{GateConfig, ServerConfig};
pub use cookies::{CookieJar, SameSite, SetCookie};
pub use error::{GateError, GateResult};
pub use extractors::{CurrentPrincipal, OptionalPrincipal};
pub use gatekeeper::{Decision, GateRequest, Gatekeeper, Verdict};
pub use loop_guard::{LoopGuard, LoopGuardScope};
pub use middleware::{GateLayer, GateMiddleware};
pub use routes::{LandingPages, MatchAction, MatcherRule, RouteClass, RouteMatcher, RouteRule, RouteTable};
pub use server::GateServer;
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
