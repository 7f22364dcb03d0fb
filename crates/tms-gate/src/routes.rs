// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route classification, landing pages and the gate matcher.
//!
//! Three static tables drive the gate:
//!
//! - [`RouteTable`] says whether a path is public, restricted to certain
//!   roles, or merely protected (any principal).
//! - [`LandingPages`] says where a role goes when it is refused.
//! - [`RouteMatcher`] decides whether the gate runs for a path at all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::error::{GateError, GateResult};

/// Prefixes that never require a principal.
pub const DEFAULT_PUBLIC_PREFIXES: &[&str] = &[
    "/login",
    "/register",
    "/forgot-password",
    "/reset-password",
    "/api/auth",
    "/api/public",
    "/verify",
    "/health",
    "/_next",
    "/favicon.ico",
    "/images",
    "/assets",
];

/// Back-office paths.
pub const DEFAULT_ADMIN_PREFIXES: &[&str] = &[
    "/dashboard",
    "/user",
    "/courses",
    "/schedules",
    "/instructors",
    "/participants",
    "/certificates",
    "/payments",
    "/reports",
    "/settings",
];

/// Instructor paths.
pub const DEFAULT_INSTRUCTOR_PREFIXES: &[&str] = &[
    "/instructure-dashboard",
    "/instructor-schedule",
    "/attendance",
];

/// Participant paths.
pub const DEFAULT_PARTICIPANT_PREFIXES: &[&str] = &[
    "/participant-dashboard",
    "/my-courses",
    "/my-certificates",
    "/my-payments",
];

/// Paths the gate never sees.
pub const DEFAULT_SKIPPED_PREFIXES: &[&str] =
    &["/_next/static", "/_next/image", "/favicon.ico", "/static"];

/// Landing paths every authenticated role may open.
///
/// `/dashboard-static` sits under the admin-only `/dashboard` prefix, so it
/// needs a longer rule of its own.
pub const DEFAULT_SHARED_PREFIXES: &[&str] = &["/dashboard-static"];

fn normalize_prefix(prefix: &str) -> GateResult<String> {
    let trimmed = prefix.trim();
    if !trimmed.starts_with('/') {
        return Err(GateError::configuration(format!(
            "route prefix '{}' must start with '/'",
            prefix
        )));
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// RouteTable
// =============================================================================

/// A role-restricted subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Path prefix.
    pub prefix: String,
    /// Roles allowed below the prefix.
    pub roles: Vec<Role>,
}

impl RouteRule {
    /// Creates a rule.
    pub fn new(prefix: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            prefix: prefix.into(),
            roles,
        }
    }

    /// Returns `true` if the rule covers `path`.
    ///
    /// Raw prefix test, like public prefixes: `/user` also covers `/users`.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(self.prefix.as_str())
    }

    /// Returns `true` if `role` may pass this rule.
    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// How a path is gated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteClass<'a> {
    /// No principal required.
    Public,
    /// A principal holding one of the rule's roles is required.
    Restricted(&'a RouteRule),
    /// Any principal is enough.
    Protected,
}

/// Static route classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    public: Vec<String>,
    restricted: Vec<RouteRule>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
            .with_public_prefixes(DEFAULT_PUBLIC_PREFIXES.iter().copied())
            .with_restricted(Role::Admin, DEFAULT_ADMIN_PREFIXES.iter().copied())
            .with_restricted(Role::Instructor, DEFAULT_INSTRUCTOR_PREFIXES.iter().copied())
            .with_restricted(Role::Participant, DEFAULT_PARTICIPANT_PREFIXES.iter().copied())
            .with_shared(DEFAULT_SHARED_PREFIXES.iter().copied())
    }
}

impl RouteTable {
    /// Creates an empty table; every path is protected.
    pub fn new() -> Self {
        Self {
            public: Vec::new(),
            restricted: Vec::new(),
        }
    }

    /// Adds public prefixes.
    pub fn with_public_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Restricts each prefix to `role`.
    ///
    /// A prefix that is already restricted gains the role instead of
    /// getting a second rule.
    pub fn with_restricted<I, S>(mut self, role: Role, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for prefix in prefixes {
            let prefix = prefix.into();
            match self.restricted.iter_mut().find(|r| r.prefix == prefix) {
                Some(rule) if !rule.roles.contains(&role) => rule.roles.push(role),
                Some(_) => {}
                None => self.restricted.push(RouteRule::new(prefix, vec![role])),
            }
        }
        self
    }

    /// Opens each prefix to every role, [`Role::Unknown`] included.
    ///
    /// Useful to carve a landing page out of a shorter restricted prefix.
    pub fn with_shared<I, S>(self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        Role::ALL
            .into_iter()
            .fold(self, |table, role| table.with_restricted(role, prefixes.iter().cloned()))
    }

    /// Checks every prefix is absolute.
    pub fn validate(&self) -> GateResult<()> {
        for prefix in &self.public {
            normalize_prefix(prefix)?;
        }
        for rule in &self.restricted {
            normalize_prefix(&rule.prefix)?;
            if rule.roles.is_empty() {
                return Err(GateError::configuration(format!(
                    "restricted prefix '{}' has no roles",
                    rule.prefix
                )));
            }
        }
        Ok(())
    }

    /// Returns the public prefixes.
    pub fn public_prefixes(&self) -> &[String] {
        &self.public
    }

    /// Returns the restricted rules.
    pub fn restricted_rules(&self) -> &[RouteRule] {
        &self.restricted
    }

    /// Returns `true` if `path` starts with a public prefix.
    ///
    /// This is a raw prefix test: `/login` also opens `/login-help`.
    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Returns the most specific restricted rule covering `path`.
    pub fn restriction(&self, path: &str) -> Option<&RouteRule> {
        self.restricted
            .iter()
            .filter(|rule| rule.matches(path))
            .max_by_key(|rule| rule.prefix.len())
    }

    /// Classifies a path.
    pub fn classify(&self, path: &str) -> RouteClass<'_> {
        if self.is_public(path) {
            return RouteClass::Public;
        }
        match self.restriction(path) {
            Some(rule) => RouteClass::Restricted(rule),
            None => RouteClass::Protected,
        }
    }

    /// Returns `true` if `role` may open a non-public `path`.
    pub fn permits(&self, role: Role, path: &str) -> bool {
        match self.restriction(path) {
            Some(rule) => rule.allows(role),
            None => true,
        }
    }
}

// =============================================================================
// LandingPages
// =============================================================================

/// Where each role is sent when it is refused a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingPages {
    pages: HashMap<Role, String>,
    login: String,
}

impl Default for LandingPages {
    fn default() -> Self {
        Self::new("/login")
            .with_page(Role::Admin, "/dashboard")
            .with_page(Role::Instructor, "/instructure-dashboard")
            .with_page(Role::Participant, "/participant-dashboard")
            .with_page(Role::Unknown, "/dashboard-static")
    }
}

impl LandingPages {
    /// Creates a table with only a login path.
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            pages: HashMap::new(),
            login: login.into(),
        }
    }

    /// Sets the landing page of a role.
    pub fn with_page(mut self, role: Role, path: impl Into<String>) -> Self {
        self.pages.insert(role, path.into());
        self
    }

    /// Sets the login path.
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = login.into();
        self
    }

    /// Returns the login path.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Returns the landing page for `role`, falling back to the unknown-role
    /// page and then to login.
    pub fn for_role(&self, role: Role) -> &str {
        self.pages
            .get(&role)
            .or_else(|| self.pages.get(&Role::Unknown))
            .map(String::as_str)
            .unwrap_or(&self.login)
    }

    /// Checks the table against the route table.
    ///
    /// A landing page its own role cannot open would redirect forever.
    pub fn validate(&self, routes: &RouteTable) -> GateResult<()> {
        normalize_prefix(&self.login)?;
        if !routes.is_public(&self.login) {
            return Err(GateError::configuration(format!(
                "login path '{}' is not public",
                self.login
            )));
        }
        for (role, page) in &self.pages {
            normalize_prefix(page)?;
            if !routes.is_public(page) && !routes.permits(*role, page) {
                return Err(GateError::configuration(format!(
                    "landing page '{}' is not reachable by role '{}'",
                    page, role
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// RouteMatcher
// =============================================================================

/// What the matcher does with a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchAction {
    /// Run the gate.
    Gate,
    /// Pass straight through.
    Skip,
}

/// One matcher entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherRule {
    /// Path prefix.
    pub prefix: String,
    /// Action for paths under the prefix.
    pub action: MatchAction,
}

impl MatcherRule {
    /// Creates a skip rule.
    pub fn skip(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            action: MatchAction::Skip,
        }
    }

    /// Creates a gate rule.
    pub fn gate(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            action: MatchAction::Gate,
        }
    }
}

/// Ordered prefix rules deciding which paths invoke the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatcher {
    rules: Vec<MatcherRule>,
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SKIPPED_PREFIXES.iter().map(|p| MatcherRule::skip(*p)).collect())
    }
}

impl RouteMatcher {
    /// Creates a matcher from ordered rules.
    pub fn new(rules: Vec<MatcherRule>) -> Self {
        Self { rules }
    }

    /// Creates a matcher that gates everything.
    pub fn gate_all() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the rules.
    pub fn rules(&self) -> &[MatcherRule] {
        &self.rules
    }

    /// Returns the action for `path`; first match wins, default is gate.
    pub fn action(&self, path: &str) -> MatchAction {
        self.rules
            .iter()
            .find(|rule| path.starts_with(rule.prefix.as_str()))
            .map(|rule| rule.action)
            .unwrap_or(MatchAction::Gate)
    }

    /// Returns `true` if the gate should run for `path`.
    pub fn should_gate(&self, path: &str) -> bool {
        self.action(path) == MatchAction::Gate
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_is_raw_prefix() {
        let table = RouteTable::default();

        for path in ["/user", "/user/7", "/users", "/user-management", "/payments-report"] {
            assert!(table.permits(Role::Admin, path), "path {}", path);
            assert!(!table.permits(Role::Participant, path), "path {}", path);
        }
        assert!(!table.permits(Role::Instructor, "/courses-admin"));
    }

    #[test]
    fn test_shared_landing_carved_out_of_dashboard() {
        let table = RouteTable::default();

        for role in Role::ALL {
            assert!(table.permits(role, "/dashboard-static"), "role {}", role);
        }
        assert!(!table.permits(Role::Unknown, "/dashboard"));
        assert!(!table.permits(Role::Participant, "/dashboard/stats"));
    }

    #[test]
    fn test_public_is_raw_prefix() {
        let table = RouteTable::default();
        assert!(table.is_public("/login"));
        assert!(table.is_public("/login/callback"));
        assert!(table.is_public("/api/auth/session"));
        assert!(table.is_public("/_next/data/x.json"));
        assert!(!table.is_public("/dashboard"));
    }

    #[test]
    fn test_classify() {
        let table = RouteTable::default();

        assert_eq!(table.classify("/register"), RouteClass::Public);
        assert_eq!(table.classify("/profile"), RouteClass::Protected);
        assert!(matches!(table.classify("/dashboard-static"), RouteClass::Restricted(rule) if rule.roles.len() == 4));

        match table.classify("/user/12") {
            RouteClass::Restricted(rule) => {
                assert_eq!(rule.prefix, "/user");
                assert!(rule.allows(Role::Admin));
                assert!(!rule.allows(Role::Participant));
            }
            other => panic!("unexpected class {:?}", other),
        }
    }

    #[test]
    fn test_instructor_paths_stay_apart() {
        let table = RouteTable::default();
        assert!(table.permits(Role::Admin, "/instructors"));
        assert!(!table.permits(Role::Instructor, "/instructors"));
        assert!(table.permits(Role::Instructor, "/instructure-dashboard"));
        assert!(table.permits(Role::Instructor, "/instructor-schedule/3"));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = RouteTable::new()
            .with_restricted(Role::Admin, ["/reports"])
            .with_restricted(Role::Instructor, ["/reports/attendance"]);

        assert!(table.permits(Role::Instructor, "/reports/attendance/5"));
        assert!(!table.permits(Role::Admin, "/reports/attendance"));
        assert!(table.permits(Role::Admin, "/reports/revenue"));
    }

    #[test]
    fn test_shared_prefix_merges_roles() {
        let table = RouteTable::new()
            .with_restricted(Role::Admin, ["/calendar"])
            .with_restricted(Role::Instructor, ["/calendar"]);

        assert_eq!(table.restricted_rules().len(), 1);
        assert!(table.permits(Role::Admin, "/calendar"));
        assert!(table.permits(Role::Instructor, "/calendar"));
        assert!(!table.permits(Role::Participant, "/calendar"));
    }

    #[test]
    fn test_landing_pages() {
        let pages = LandingPages::default();
        assert_eq!(pages.for_role(Role::Admin), "/dashboard");
        assert_eq!(pages.for_role(Role::Instructor), "/instructure-dashboard");
        assert_eq!(pages.for_role(Role::Participant), "/participant-dashboard");
        assert_eq!(pages.for_role(Role::Unknown), "/dashboard-static");
        assert_eq!(pages.login(), "/login");

        let sparse = LandingPages::new("/login");
        assert_eq!(sparse.for_role(Role::Admin), "/login");
    }

    #[test]
    fn test_default_landing_pages_are_reachable() {
        assert!(LandingPages::default().validate(&RouteTable::default()).is_ok());
    }

    #[test]
    fn test_unreachable_landing_page_rejected() {
        let pages = LandingPages::default().with_page(Role::Participant, "/dashboard");
        let result = pages.validate(&RouteTable::default());
        assert!(matches!(result, Err(GateError::Configuration { .. })));
    }

    #[test]
    fn test_relative_prefix_rejected() {
        let table = RouteTable::new().with_public_prefixes(["login"]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_matcher_first_match_wins() {
        let matcher = RouteMatcher::new(vec![
            MatcherRule::gate("/static/private"),
            MatcherRule::skip("/static"),
        ]);

        assert!(matcher.should_gate("/static/private/a.pdf"));
        assert!(!matcher.should_gate("/static/logo.png"));
        assert!(matcher.should_gate("/courses"));
    }

    #[test]
    fn test_default_matcher_skips_assets() {
        let matcher = RouteMatcher::default();
        assert!(!matcher.should_gate("/_next/static/chunk.js"));
        assert!(!matcher.should_gate("/favicon.ico"));
        assert!(matcher.should_gate("/_next/data/page.json"));
        assert!(matcher.should_gate("/dashboard"));
        assert!(RouteMatcher::gate_all().should_gate("/static/x"));
    }
}
