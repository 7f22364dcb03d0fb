// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Extractors for handlers behind the gate.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::Principal;
use crate::error::GateError;

/// The principal the gate resolved for this request.
///
/// Rejects with 401 when the gate did not attach one, which happens on public
/// and skipped paths and when a request passes on the loop guard.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentPrincipal(user): CurrentPrincipal) -> String {
///     format!("Hello, {}", user.id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or_else(|| GateError::unauthorized("Authentication required"))
    }
}

/// The principal, if the gate attached one.
#[derive(Debug, Clone)]
pub struct OptionalPrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalPrincipal(parts.extensions.get::<Principal>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, CredentialSource};
    use axum::http::Request;

    #[tokio::test]
    async fn test_current_principal_requires_extension() {
        let (mut parts, _) = Request::new(()).into_parts();
        let result = CurrentPrincipal::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(GateError::Unauthorized { .. })));

        let principal = Principal::from_claims(&Claims::new("5", 60), CredentialSource::Admin);
        parts.extensions.insert(principal.clone());

        let CurrentPrincipal(found) = CurrentPrincipal::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(found, principal);
    }

    #[tokio::test]
    async fn test_optional_principal() {
        let (mut parts, _) = Request::new(()).into_parts();
        let OptionalPrincipal(found) = OptionalPrincipal::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
