// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The request gatekeeper.
//!
//! # Decision order
//!
//! ```text
//! path public? ──yes──▶ Proceed
//!      │no
//! loop guard tripped? ──yes──▶ ProceedAndClearCookie(guard)
//!      │no
//! resolve principal ──none──▶ RedirectTo(login, arm guard)
//!      │some
//! role permitted? ──yes──▶ Proceed
//!      │no
//!      └──▶ RedirectTo(landing page of role)
//! ```
//!
//! Anything that fails along the way (an unreadable `Cookie` header, a
//! relative path) ends in `RedirectTo(login)` without arming the guard. The
//! gatekeeper never returns an error to its caller.

use std::sync::Arc;

use axum::http::{HeaderValue, Request, header};

use crate::auth::{
    ClaimsDecoder, CredentialResolver, CredentialSource, JwtManager, Principal, SessionDecoder,
};
use crate::config::GateConfig;
use crate::cookies::{CookieJar, SetCookie};
use crate::error::{GateError, GateResult};
use crate::loop_guard::LoopGuard;
use crate::routes::{LandingPages, RouteMatcher, RouteTable};

// =============================================================================
// GateRequest
// =============================================================================

/// The parts of a request the gatekeeper looks at.
#[derive(Debug, Clone, Default)]
pub struct GateRequest {
    path: String,
    cookie_headers: Vec<HeaderValue>,
}

impl GateRequest {
    /// Creates a request for `path` with no cookies.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cookie_headers: Vec::new(),
        }
    }

    /// Captures the path and `Cookie` headers of an HTTP request.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            path: request.uri().path().to_string(),
            cookie_headers: request
                .headers()
                .get_all(header::COOKIE)
                .iter()
                .cloned()
                .collect(),
        }
    }

    /// Adds a `name=value` cookie. Pairs that are not valid header text are
    /// ignored.
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(&format!("{}={}", name, value)) {
            self.cookie_headers.push(value);
        }
        self
    }

    /// Adds a raw `Cookie` header value.
    pub fn with_cookie_header(mut self, value: HeaderValue) -> Self {
        self.cookie_headers.push(value);
        self
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw `Cookie` header values.
    pub fn cookie_headers(&self) -> &[HeaderValue] {
        &self.cookie_headers
    }
}

// =============================================================================
// Decision / Verdict
// =============================================================================

/// What to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward unchanged.
    Proceed,
    /// Forward, and expire the named cookie on the response.
    ProceedAndClearCookie(String),
    /// Answer with a redirect.
    RedirectTo {
        /// Redirect target.
        location: String,
        /// Cookie to set with the redirect.
        set_cookie: Option<SetCookie>,
    },
}

impl Decision {
    /// Creates a redirect without side-effect cookie.
    pub fn redirect(location: impl Into<String>) -> Self {
        Decision::RedirectTo {
            location: location.into(),
            set_cookie: None,
        }
    }

    /// Returns `true` if the request is forwarded.
    pub fn is_proceed(&self) -> bool {
        matches!(self, Decision::Proceed | Decision::ProceedAndClearCookie(_))
    }

    /// Returns the redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            Decision::RedirectTo { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// A decision together with the principal it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// The decision.
    pub decision: Decision,
    /// Resolved principal, when resolution ran and succeeded.
    pub principal: Option<Principal>,
}

impl Verdict {
    fn anonymous(decision: Decision) -> Self {
        Self {
            decision,
            principal: None,
        }
    }
}

// =============================================================================
// Gatekeeper
// =============================================================================

/// Decides, per request, whether to forward or redirect.
///
/// Stateless apart from its immutable tables, so a single instance is shared
/// by every request.
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    resolver: Arc<CredentialResolver>,
    routes: Arc<RouteTable>,
    landing: Arc<LandingPages>,
    matcher: Arc<RouteMatcher>,
    loop_guard: Arc<LoopGuard>,
}

impl Gatekeeper {
    /// Creates a gatekeeper with default tables around a resolver.
    pub fn new(resolver: CredentialResolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
            routes: Arc::new(RouteTable::default()),
            landing: Arc::new(LandingPages::default()),
            matcher: Arc::new(RouteMatcher::default()),
            loop_guard: Arc::new(LoopGuard::default()),
        }
    }

    /// Builds a gatekeeper from configuration.
    ///
    /// Fails when the signing secret is missing or a table is inconsistent.
    pub fn from_config(config: &GateConfig) -> GateResult<Self> {
        config.validate()?;

        let tokens: Arc<dyn ClaimsDecoder> = Arc::new(JwtManager::new(config.jwt.clone())?);
        let session = SessionDecoder::from_optional(config.session.as_ref())?
            .map(|decoder| Arc::new(decoder) as Arc<dyn ClaimsDecoder>);

        let mut resolver = CredentialResolver::standard(tokens, session);
        for source in CredentialSource::PRIORITY {
            let names = config.cookie_names_for(source);
            if let Some(slot) = resolver.slot_mut(source) {
                slot.cookie_names = names;
            }
        }

        tracing::info!(
            sources = resolver.slots().len(),
            public_prefixes = config.routes.public_prefixes().len(),
            restricted_rules = config.routes.restricted_rules().len(),
            loop_guard = ?config.loop_guard.scope(),
            "Gatekeeper configured"
        );

        Ok(Self::new(resolver)
            .with_routes(config.routes.clone())
            .with_landing(config.landing.clone())
            .with_matcher(config.matcher.clone())
            .with_loop_guard(config.loop_guard.clone()))
    }

    /// Sets the route table.
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = Arc::new(routes);
        self
    }

    /// Sets the landing pages.
    pub fn with_landing(mut self, landing: LandingPages) -> Self {
        self.landing = Arc::new(landing);
        self
    }

    /// Sets the gate matcher.
    pub fn with_matcher(mut self, matcher: RouteMatcher) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    /// Sets the loop guard.
    pub fn with_loop_guard(mut self, loop_guard: LoopGuard) -> Self {
        self.loop_guard = Arc::new(loop_guard);
        self
    }

    /// Returns the credential resolver.
    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// Returns the route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Returns the landing pages.
    pub fn landing(&self) -> &LandingPages {
        &self.landing
    }

    /// Returns the loop guard.
    pub fn loop_guard(&self) -> &LoopGuard {
        &self.loop_guard
    }

    /// Returns `true` if the gate runs for `path` at all.
    pub fn should_gate(&self, path: &str) -> bool {
        self.matcher.should_gate(path)
    }

    /// Returns the decision for a request.
    pub fn handle(&self, request: &GateRequest) -> Decision {
        self.evaluate(request).decision
    }

    /// Returns the decision and the principal it was made for.
    pub fn evaluate(&self, request: &GateRequest) -> Verdict {
        match self.try_evaluate(request) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(
                    path = %request.path(),
                    error = %e,
                    "Gate evaluation failed, redirecting to login"
                );
                Verdict::anonymous(Decision::redirect(self.landing.login()))
            }
        }
    }

    /// Resolves the principal of a request without applying route rules.
    pub fn principal(&self, request: &GateRequest) -> GateResult<Principal> {
        let jar = CookieJar::parse(request.cookie_headers())?;
        Ok(self.resolver.resolve(&jar)?)
    }

    fn try_evaluate(&self, request: &GateRequest) -> GateResult<Verdict> {
        let path = request.path();
        if !path.starts_with('/') {
            return Err(GateError::internal(format!("request path '{}' is not absolute", path)));
        }

        if self.routes.is_public(path) {
            tracing::trace!(path = %path, "Public path");
            return Ok(Verdict::anonymous(Decision::Proceed));
        }

        let jar = CookieJar::parse(request.cookie_headers())?;

        if self.loop_guard.is_tripped(&jar, path) {
            tracing::debug!(path = %path, cookie = %self.loop_guard.cookie(), "Loop guard tripped, letting request through");
            return Ok(Verdict::anonymous(Decision::ProceedAndClearCookie(
                self.loop_guard.cookie().to_string(),
            )));
        }

        let principal = match self.resolver.resolve(&jar) {
            Ok(principal) => principal,
            Err(e) => {
                tracing::debug!(path = %path, reason = %e, "No verified credential, redirecting to login");
                return Ok(Verdict::anonymous(Decision::RedirectTo {
                    location: self.landing.login().to_string(),
                    set_cookie: self.loop_guard.arm(path),
                }));
            }
        };

        if self.routes.permits(principal.role, path) {
            return Ok(Verdict {
                decision: Decision::Proceed,
                principal: Some(principal),
            });
        }

        let landing = self.landing.for_role(principal.role);
        tracing::debug!(
            path = %path,
            subject = %principal.id,
            role = %principal.role,
            landing = %landing,
            "Role not permitted, redirecting to landing page"
        );

        Ok(Verdict {
            decision: Decision::redirect(landing),
            principal: Some(principal),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, Role};
    use crate::loop_guard::LoopGuardScope;

    const SECRET: &str = "gatekeeper-unit-test-secret-0123456789";

    fn gate() -> Gatekeeper {
        Gatekeeper::from_config(&GateConfig::new(SECRET)).unwrap()
    }

    fn token(role: &str) -> String {
        JwtManager::new(JwtConfig::new(SECRET))
            .unwrap()
            .mint("u1", role, Some("u1@example.com"), None)
            .unwrap()
    }

    #[test]
    fn test_public_path_ignores_cookies() {
        let request = GateRequest::new("/login").with_cookie("admin_token", "garbage");
        assert_eq!(gate().handle(&request), Decision::Proceed);
    }

    #[test]
    fn test_no_credential_redirects_and_arms_guard() {
        let decision = gate().handle(&GateRequest::new("/courses"));

        match decision {
            Decision::RedirectTo { location, set_cookie } => {
                assert_eq!(location, "/login");
                let cookie = set_cookie.unwrap();
                assert_eq!(cookie.name, "redirect_attempt");
                assert_eq!(cookie.value, "true");
                assert_eq!(cookie.max_age, Some(60));
            }
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn test_guard_lets_request_through() {
        let request = GateRequest::new("/courses").with_cookie("redirect_attempt", "true");
        assert_eq!(
            gate().handle(&request),
            Decision::ProceedAndClearCookie("redirect_attempt".to_string())
        );
    }

    #[test]
    fn test_role_permitted() {
        let request = GateRequest::new("/dashboard").with_cookie("admin_token", &token("admin"));
        let verdict = gate().evaluate(&request);

        assert_eq!(verdict.decision, Decision::Proceed);
        assert_eq!(verdict.principal.unwrap().role, Role::Admin);
    }

    #[test]
    fn test_role_mismatch_goes_to_landing() {
        let request = GateRequest::new("/user").with_cookie("dashboard_token", &token("participant"));
        assert_eq!(
            gate().handle(&request),
            Decision::redirect("/participant-dashboard")
        );
    }

    #[test]
    fn test_unknown_role_lands_on_static_dashboard() {
        let gate = gate();
        let cookie = token("auditor");

        let refused = GateRequest::new("/payments").with_cookie("debug_token", &cookie);
        assert_eq!(gate.handle(&refused), Decision::redirect("/dashboard-static"));

        let landing = GateRequest::new("/dashboard-static").with_cookie("debug_token", &cookie);
        assert_eq!(gate.handle(&landing), Decision::Proceed);
    }

    #[test]
    fn test_protected_path_admits_any_role() {
        let request = GateRequest::new("/profile").with_cookie("admin_token", &token("instructor"));
        assert_eq!(gate().handle(&request), Decision::Proceed);
    }

    #[test]
    fn test_malformed_cookie_header_redirects_without_guard() {
        let header = HeaderValue::from_bytes(b"admin_token=\xff").unwrap();
        let request = GateRequest::new("/courses").with_cookie_header(header);

        assert_eq!(gate().handle(&request), Decision::redirect("/login"));
    }

    #[test]
    fn test_relative_path_redirects_to_login() {
        assert_eq!(
            gate().handle(&GateRequest::new("courses")),
            Decision::redirect("/login")
        );
    }

    #[test]
    fn test_path_scoped_guard() {
        let config = GateConfig::new(SECRET)
            .with_loop_guard(LoopGuard::new().with_scope(LoopGuardScope::Path));
        let gate = Gatekeeper::from_config(&config).unwrap();

        let same = GateRequest::new("/courses").with_cookie("redirect_attempt", "/courses");
        assert!(gate.handle(&same).is_proceed());

        let other = GateRequest::new("/payments").with_cookie("redirect_attempt", "/courses");
        assert_eq!(gate.handle(&other).location(), Some("/login"));
    }

    #[test]
    fn test_from_config_requires_secret() {
        let result = Gatekeeper::from_config(&GateConfig::new(" "));
        assert!(matches!(result, Err(GateError::Configuration { .. })));
    }

    #[test]
    fn test_from_request() {
        let request = Request::builder()
            .uri("/courses/3?tab=info")
            .header(header::COOKIE, "a=1")
            .header(header::COOKIE, "b=2")
            .body(())
            .unwrap();
        let gate_request = GateRequest::from_request(&request);

        assert_eq!(gate_request.path(), "/courses/3");
        assert_eq!(gate_request.cookie_headers().len(), 2);
    }

    #[test]
    fn test_principal_lookup() {
        let gate = gate();
        let request = GateRequest::new("/anything").with_cookie("admin_token", &token("Admin"));
        assert_eq!(gate.principal(&request).unwrap().role_label, "admin");

        assert!(gate.principal(&GateRequest::new("/anything")).is_err());
    }
}
