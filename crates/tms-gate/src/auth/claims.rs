// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential claims payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Claims carried by every credential cookie.
///
/// The purpose cookies are minted by the login flow with `id` as the subject
/// key and a numeric database id, while session-framework tokens use `sub`.
/// Both spellings and both value types are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    #[serde(alias = "id", deserialize_with = "deserialize_subject")]
    pub sub: String,

    /// Expiration time (Unix timestamp). Tokens without one never expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at time (Unix timestamp).
    #[serde(default)]
    pub iat: i64,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// User's email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// User's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Raw role label, as stored by the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Claims {
    /// Creates claims for a subject that expire after `expires_in_secs`.
    pub fn new(subject: impl Into<String>, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: subject.into(),
            exp: Some(now + expires_in_secs),
            iat: now,
            iss: None,
            email: None,
            name: None,
            role: None,
        }
    }

    /// Creates a builder for constructing claims.
    pub fn builder(subject: impl Into<String>) -> ClaimsBuilder {
        ClaimsBuilder::new(subject)
    }

    /// Returns the subject id.
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Returns the raw role label, or an empty string.
    pub fn role_label(&self) -> &str {
        self.role.as_deref().unwrap_or("")
    }

    /// Returns `true` if the token carries an `exp` in the past.
    pub fn is_expired(&self) -> bool {
        self.exp.is_some_and(|exp| Utc::now().timestamp() > exp)
    }

    /// Returns the expiration time, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

// =============================================================================
// Claims Builder
// =============================================================================

/// Builder for constructing claims.
#[derive(Debug)]
pub struct ClaimsBuilder {
    subject: String,
    expires_in_secs: Option<i64>,
    issuer: Option<String>,
    email: Option<String>,
    name: Option<String>,
    role: Option<String>,
}

impl ClaimsBuilder {
    /// Creates a new builder.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            expires_in_secs: Some(3600),
            issuer: None,
            email: None,
            name: None,
            role: None,
        }
    }

    /// Sets the lifetime in seconds (negative values produce expired claims).
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.expires_in_secs = Some(seconds);
        self
    }

    /// Leaves `exp` out.
    pub fn without_expiry(mut self) -> Self {
        self.expires_in_secs = None;
        self
    }

    /// Sets the issuer.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the role label exactly as given.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Builds the claims.
    pub fn build(self) -> Claims {
        let mut claims = Claims::new(self.subject, 0);
        claims.exp = self.expires_in_secs.map(|secs| claims.iat + secs);
        claims.iss = self.issuer;
        claims.email = self.email;
        claims.name = self.name;
        claims.role = self.role;
        claims
    }
}

// =============================================================================
// Subject deserialization
// =============================================================================

fn deserialize_subject<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "subject must be a string or number, got {}",
            other
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_builder() {
        let claims = Claims::builder("42")
            .email("lee@example.com")
            .name("Lee")
            .role("Instructor")
            .expires_in(600)
            .build();

        assert_eq!(claims.subject(), "42");
        assert_eq!(claims.role_label(), "Instructor");
        assert_eq!(claims.email.as_deref(), Some("lee@example.com"));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_numeric_id_alias() {
        let json = r#"{"id": 17, "exp": 4102444800, "role": "admin"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.sub, "17");
        assert_eq!(claims.iat, 0);
        assert_eq!(claims.role_label(), "admin");
    }

    #[test]
    fn test_string_sub() {
        let json = r#"{"sub": "cuid_abc", "exp": 4102444800}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.sub, "cuid_abc");
        assert_eq!(claims.role_label(), "");
    }

    #[test]
    fn test_rejects_object_subject() {
        let json = r#"{"sub": {"nested": true}, "exp": 4102444800}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }

    #[test]
    fn test_missing_exp_never_expires() {
        let json = r#"{"id": 7, "role": "admin"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.exp, None);
        assert!(!claims.is_expired());
        assert!(claims.expires_at().is_none());

        let minted = Claims::builder("7").without_expiry().build();
        assert_eq!(minted.exp, None);
        assert!(!serde_json::to_string(&minted).unwrap().contains("exp"));
    }

    #[test]
    fn test_expired_claims() {
        let claims = Claims::builder("u").expires_in(-120).build();
        assert!(claims.is_expired());
        assert!(claims.expires_at().is_some());
    }
}
