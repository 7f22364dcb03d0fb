// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HMAC token signing and verification.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::credential::{ClaimsDecoder, CredentialError};
use super::Claims;
use crate::error::{GateError, GateResult};

// =============================================================================
// JwtConfig
// =============================================================================

/// Token verification settings for one signing secret.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Shared signing secret. There is no default: an empty secret is rejected.
    #[serde(skip_serializing)]
    pub secret: String,
    /// HMAC algorithm.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Expected issuer; not checked when unset.
    pub issuer: Option<String>,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
    /// Lifetime of tokens minted through [`JwtManager::mint`].
    pub expiration_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: Algorithm::HS256,
            issuer: None,
            leeway_secs: 60,
            expiration_secs: 86400,
        }
    }
}

impl JwtConfig {
    /// Creates a configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the expected issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GateResult<()> {
        if self.secret.trim().is_empty() {
            return Err(GateError::configuration("signing secret is not configured"));
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(GateError::configuration(format!(
                "unsupported algorithm {:?}: only HMAC secrets are supported",
                self.algorithm
            )));
        }
        if self.secret.len() < 32 {
            tracing::warn!("Signing secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

// =============================================================================
// JwtManager
// =============================================================================

/// Signs and verifies HMAC tokens with a single secret.
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a new manager, failing if the secret is missing.
    pub fn new(config: JwtConfig) -> GateResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;
        // A verified signature is enough; `exp` is checked only when present.
        validation.required_spec_claims.clear();
        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["iss"]);
        }

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs the given claims.
    pub fn create_token(&self, claims: &Claims) -> GateResult<String> {
        let header = Header::new(self.config.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| GateError::internal(format!("Failed to create token: {}", e)))
    }

    /// Mints a token for a subject with the configured lifetime and issuer.
    pub fn mint(
        &self,
        subject: &str,
        role: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> GateResult<String> {
        let mut builder = Claims::builder(subject)
            .role(role)
            .expires_in(self.config.expiration_secs);
        if let Some(issuer) = &self.config.issuer {
            builder = builder.issuer(issuer);
        }
        if let Some(email) = email {
            builder = builder.email(email);
        }
        if let Some(name) = name {
            builder = builder.name(name);
        }

        self.create_token(&builder.build())
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                ErrorKind::InvalidSignature => CredentialError::InvalidSignature,
                ErrorKind::InvalidIssuer => CredentialError::rejected("issuer mismatch"),
                ErrorKind::MissingRequiredClaim(claim) => {
                    CredentialError::rejected(format!("missing {} claim", claim))
                }
                ErrorKind::InvalidAlgorithm => CredentialError::rejected("algorithm mismatch"),
                ErrorKind::ImmatureSignature => CredentialError::rejected("not yet valid"),
                _ => CredentialError::malformed(e.to_string()),
            })
    }

    /// Returns the token lifetime in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.config.expiration_secs
    }
}

impl ClaimsDecoder for JwtManager {
    fn decode(&self, token: &str) -> Result<Claims, CredentialError> {
        self.verify(token)
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("algorithm", &self.config.algorithm)
            .field("issuer", &self.config.issuer)
            .finish()
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            _ => "HS256",
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported algorithm: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    #[test]
    fn test_mint_and_verify() {
        let manager = JwtManager::new(JwtConfig::new(SECRET)).unwrap();

        let token = manager
            .mint("7", "admin", Some("admin@example.com"), Some("Ada"))
            .unwrap();
        let claims = manager.verify(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role_label(), "admin");
        assert_eq!(claims.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = JwtManager::new(JwtConfig::new("   "));
        assert!(matches!(result, Err(GateError::Configuration { .. })));
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new(JwtConfig::new(SECRET).with_leeway(0)).unwrap();

        let claims = Claims::builder("user").expires_in(-3600).build();
        let token = manager.create_token(&claims).unwrap();

        assert_eq!(manager.verify(&token), Err(CredentialError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let one = JwtManager::new(JwtConfig::new("secret-one-for-testing-purposes-0001")).unwrap();
        let two = JwtManager::new(JwtConfig::new("secret-two-for-testing-purposes-0002")).unwrap();

        let token = one.mint("user", "admin", None, None).unwrap();

        assert_eq!(two.verify(&token), Err(CredentialError::InvalidSignature));
    }

    #[test]
    fn test_token_without_exp_is_trusted() {
        let manager = JwtManager::new(JwtConfig::new(SECRET)).unwrap();

        let claims = Claims::builder("7").role("admin").without_expiry().build();
        let token = manager.create_token(&claims).unwrap();

        let verified = manager.verify(&token).unwrap();
        assert_eq!(verified.sub, "7");
        assert_eq!(verified.exp, None);
    }

    #[test]
    fn test_garbage_token() {
        let manager = JwtManager::new(JwtConfig::new(SECRET)).unwrap();

        let result = manager.verify("invalid.token.here");
        assert!(matches!(result, Err(CredentialError::Malformed(_))));
    }

    #[test]
    fn test_issuer_enforced_when_configured() {
        let strict = JwtManager::new(JwtConfig::new(SECRET).with_issuer("tms")).unwrap();
        let lax = JwtManager::new(JwtConfig::new(SECRET)).unwrap();

        let token = lax.mint("user", "admin", None, None).unwrap();

        assert!(strict.verify(&token).is_err());
        assert!(lax.verify(&token).is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", JwtConfig::new(SECRET));
        assert!(!rendered.contains(SECRET));
    }
}
