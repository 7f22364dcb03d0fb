// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential sources and the ordered resolution chain.
//!
//! Every login mechanism of the application drops a signed token into its
//! own cookie. They all describe the same user, so the resolver walks the
//! slots in a fixed order and the first token that verifies wins. Failures
//! are logged and swallowed; only exhaustion is reported to the caller.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Claims, Principal};
use crate::cookies::CookieJar;

// =============================================================================
// CredentialSource
// =============================================================================

/// Issuing purpose of a credential, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// Cookie set by the admin login.
    Admin,
    /// Cookie set by the dashboard login.
    Dashboard,
    /// Cookie set by the debug login.
    Debug,
    /// Session cookie of the authentication framework.
    Session,
}

impl CredentialSource {
    /// All sources in the order they are tried.
    pub const PRIORITY: [CredentialSource; 4] = [
        CredentialSource::Admin,
        CredentialSource::Dashboard,
        CredentialSource::Debug,
        CredentialSource::Session,
    ];

    /// Returns the source name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Admin => "admin",
            CredentialSource::Dashboard => "dashboard",
            CredentialSource::Debug => "debug",
            CredentialSource::Session => "session",
        }
    }

    /// Parses a source name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(CredentialSource::Admin),
            "dashboard" => Some(CredentialSource::Dashboard),
            "debug" => Some(CredentialSource::Debug),
            "session" => Some(CredentialSource::Session),
            _ => None,
        }
    }

    /// Returns the default cookie names for this source.
    pub fn default_cookie_names(&self) -> Vec<String> {
        match self {
            CredentialSource::Admin => vec!["admin_token".to_string()],
            CredentialSource::Dashboard => vec!["dashboard_token".to_string()],
            CredentialSource::Debug => vec!["debug_token".to_string()],
            CredentialSource::Session => vec![
                "next-auth.session-token".to_string(),
                "__Secure-next-auth.session-token".to_string(),
            ],
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Credential
// =============================================================================

/// A token lifted from one cookie slot.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Which slot the token came from.
    pub source: CredentialSource,
    /// Cookie name that carried it.
    pub cookie: String,
    /// Opaque bearer value.
    pub token: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("source", &self.source)
            .field("cookie", &self.cookie)
            .field("token", &"***")
            .finish()
    }
}

// =============================================================================
// CredentialError
// =============================================================================

/// Why a credential could not be turned into a principal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// No credential cookie was presented at all.
    #[error("no credential presented")]
    Absent,

    /// Signature verified but the token is past its expiry.
    #[error("credential has expired")]
    Expired,

    /// Signature does not match the secret.
    #[error("credential signature is invalid")]
    InvalidSignature,

    /// Token or payload could not be parsed.
    #[error("credential is malformed: {0}")]
    Malformed(String),

    /// Token is well formed but fails a claim check.
    #[error("credential rejected: {0}")]
    Rejected(String),

    /// Every presented credential failed.
    #[error("none of {attempted} presented credential(s) verified")]
    Exhausted {
        /// Number of credentials that were tried.
        attempted: usize,
    },
}

impl CredentialError {
    /// Creates a malformed error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Creates a rejected error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

// =============================================================================
// ClaimsDecoder
// =============================================================================

/// Turns a raw token into verified claims.
///
/// The purpose cookies share one HMAC secret; the session cookie is decoded by
/// a separate instance configured with the session framework's secret.
pub trait ClaimsDecoder: Send + Sync + fmt::Debug {
    /// Verifies `token` and returns its claims.
    fn decode(&self, token: &str) -> Result<Claims, CredentialError>;
}

// =============================================================================
// CredentialSlot
// =============================================================================

/// One entry of the resolution chain.
#[derive(Debug, Clone)]
pub struct CredentialSlot {
    /// Source tag attached to principals resolved here.
    pub source: CredentialSource,
    /// Cookie names checked for this source, first present one is used.
    pub cookie_names: Vec<String>,
    /// Decoder for tokens of this source.
    pub decoder: Arc<dyn ClaimsDecoder>,
}

impl CredentialSlot {
    /// Creates a slot for `source` with its default cookie names.
    pub fn new(source: CredentialSource, decoder: Arc<dyn ClaimsDecoder>) -> Self {
        Self {
            source,
            cookie_names: source.default_cookie_names(),
            decoder,
        }
    }

    /// Overrides the cookie names.
    pub fn with_cookie_names(mut self, names: Vec<String>) -> Self {
        self.cookie_names = names;
        self
    }

    /// Returns the credential this slot would try, if any cookie is present.
    pub fn pick(&self, jar: &CookieJar) -> Option<Credential> {
        self.cookie_names.iter().find_map(|name| {
            jar.get(name)
                .filter(|value| !value.is_empty())
                .map(|value| Credential {
                    source: self.source,
                    cookie: name.clone(),
                    token: value.to_string(),
                })
        })
    }

    /// Verifies a credential picked from this slot.
    pub fn verify(&self, credential: &Credential) -> Result<Principal, CredentialError> {
        let claims = self.decoder.decode(&credential.token)?;
        Ok(Principal::from_claims(&claims, credential.source))
    }
}

// =============================================================================
// CredentialResolver
// =============================================================================

/// Ordered list of credential slots.
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    slots: Vec<CredentialSlot>,
}

impl CredentialResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard chain: admin, dashboard and debug cookies share
    /// `token_decoder`; the session cookie uses `session_decoder` when given.
    pub fn standard(
        token_decoder: Arc<dyn ClaimsDecoder>,
        session_decoder: Option<Arc<dyn ClaimsDecoder>>,
    ) -> Self {
        let mut resolver = Self::new()
            .with_slot(CredentialSlot::new(CredentialSource::Admin, token_decoder.clone()))
            .with_slot(CredentialSlot::new(CredentialSource::Dashboard, token_decoder.clone()))
            .with_slot(CredentialSlot::new(CredentialSource::Debug, token_decoder));

        if let Some(decoder) = session_decoder {
            resolver = resolver.with_slot(CredentialSlot::new(CredentialSource::Session, decoder));
        }

        resolver
    }

    /// Appends a slot. Slots are tried in insertion order.
    pub fn with_slot(mut self, slot: CredentialSlot) -> Self {
        self.slots.push(slot);
        self
    }

    /// Returns the configured slots.
    pub fn slots(&self) -> &[CredentialSlot] {
        &self.slots
    }

    /// Returns a mutable slot for `source`.
    pub fn slot_mut(&mut self, source: CredentialSource) -> Option<&mut CredentialSlot> {
        self.slots.iter_mut().find(|slot| slot.source == source)
    }

    /// Returns every cookie name that can carry a credential.
    pub fn cookie_names(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .flat_map(|slot| slot.cookie_names.iter().map(String::as_str))
    }

    /// Resolves the principal from the first credential that verifies.
    pub fn resolve(&self, jar: &CookieJar) -> Result<Principal, CredentialError> {
        let mut attempted = 0;

        for slot in &self.slots {
            let Some(credential) = slot.pick(jar) else {
                tracing::trace!(source = %slot.source, "No credential for source");
                continue;
            };

            attempted += 1;
            match slot.verify(&credential) {
                Ok(principal) => {
                    tracing::debug!(
                        source = %slot.source,
                        cookie = %credential.cookie,
                        subject = %principal.id,
                        role = %principal.role_label,
                        "Credential verified"
                    );
                    return Ok(principal);
                }
                Err(e) => {
                    tracing::debug!(
                        source = %slot.source,
                        cookie = %credential.cookie,
                        error = %e,
                        "Credential rejected, trying next source"
                    );
                }
            }
        }

        if attempted == 0 {
            Err(CredentialError::Absent)
        } else {
            Err(CredentialError::Exhausted { attempted })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, JwtManager, Role};

    const SECRET: &str = "credential-test-secret-that-is-long-enough";
    const SESSION_SECRET: &str = "session-test-secret-that-is-also-long-enough";

    fn manager(secret: &str) -> Arc<JwtManager> {
        Arc::new(JwtManager::new(JwtConfig::new(secret)).unwrap())
    }

    fn resolver() -> CredentialResolver {
        CredentialResolver::standard(manager(SECRET), Some(manager(SESSION_SECRET)))
    }

    fn jar(pairs: &[(&str, &str)]) -> CookieJar {
        let mut jar = CookieJar::new();
        for (name, value) in pairs {
            jar.insert(*name, *value);
        }
        jar
    }

    #[test]
    fn test_priority_order() {
        let tokens = manager(SECRET);
        let admin = tokens.mint("1", "admin", None, None).unwrap();
        let dashboard = tokens.mint("2", "participant", None, None).unwrap();

        let principal = resolver()
            .resolve(&jar(&[("dashboard_token", &dashboard), ("admin_token", &admin)]))
            .unwrap();

        assert_eq!(principal.id, "1");
        assert_eq!(principal.source, CredentialSource::Admin);
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn test_fallthrough_on_bad_credential() {
        let dashboard = manager(SECRET).mint("2", "instructor", None, None).unwrap();

        let principal = resolver()
            .resolve(&jar(&[("admin_token", "garbage"), ("dashboard_token", &dashboard)]))
            .unwrap();

        assert_eq!(principal.source, CredentialSource::Dashboard);
        assert_eq!(principal.role, Role::Instructor);
    }

    #[test]
    fn test_session_uses_its_own_secret() {
        let forged = manager(SECRET).mint("3", "admin", None, None).unwrap();
        let genuine = manager(SESSION_SECRET).mint("3", "admin", None, None).unwrap();

        let result = resolver().resolve(&jar(&[("next-auth.session-token", &forged)]));
        assert_eq!(result, Err(CredentialError::Exhausted { attempted: 1 }));

        let principal = resolver()
            .resolve(&jar(&[("__Secure-next-auth.session-token", &genuine)]))
            .unwrap();
        assert_eq!(principal.source, CredentialSource::Session);
    }

    #[test]
    fn test_session_slot_disabled_without_decoder() {
        let genuine = manager(SESSION_SECRET).mint("3", "admin", None, None).unwrap();
        let resolver = CredentialResolver::standard(manager(SECRET), None);

        assert_eq!(resolver.slots().len(), 3);
        assert_eq!(
            resolver.resolve(&jar(&[("next-auth.session-token", &genuine)])),
            Err(CredentialError::Absent)
        );
    }

    #[test]
    fn test_absent_vs_exhausted() {
        assert_eq!(resolver().resolve(&CookieJar::new()), Err(CredentialError::Absent));
        assert_eq!(
            resolver().resolve(&jar(&[("admin_token", "x"), ("debug_token", "y")])),
            Err(CredentialError::Exhausted { attempted: 2 })
        );
    }

    #[test]
    fn test_empty_cookie_value_is_absent() {
        assert_eq!(
            resolver().resolve(&jar(&[("admin_token", "")])),
            Err(CredentialError::Absent)
        );
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let credential = Credential {
            source: CredentialSource::Debug,
            cookie: "debug_token".to_string(),
            token: "secret-bearer".to_string(),
        };
        assert!(!format!("{:?}", credential).contains("secret-bearer"));
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(CredentialSource::parse("Admin"), Some(CredentialSource::Admin));
        assert_eq!(CredentialSource::parse("session"), Some(CredentialSource::Session));
        assert_eq!(CredentialSource::parse("cookie"), None);
    }
}
