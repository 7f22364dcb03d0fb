// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tower layer running the gatekeeper in front of every route.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::cookies::SetCookie;
use crate::error::{GateError, GateResult};
use crate::gatekeeper::{Decision, GateRequest, Gatekeeper};

// =============================================================================
// GateLayer
// =============================================================================

/// Layer that applies a [`Gatekeeper`] to each request.
#[derive(Debug, Clone)]
pub struct GateLayer {
    gatekeeper: Gatekeeper,
}

impl GateLayer {
    /// Creates a new gate layer.
    pub fn new(gatekeeper: Gatekeeper) -> Self {
        Self { gatekeeper }
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateMiddleware {
            inner,
            gatekeeper: self.gatekeeper.clone(),
        }
    }
}

// =============================================================================
// GateMiddleware
// =============================================================================

/// Middleware produced by [`GateLayer`].
///
/// Paths excluded by the matcher go straight to the inner service. For the
/// rest, the resolved [`Principal`](crate::auth::Principal) is stored in the
/// request extensions before the request is forwarded.
#[derive(Debug, Clone)]
pub struct GateMiddleware<S> {
    inner: S,
    gatekeeper: Gatekeeper,
}

impl<S> Service<Request<Body>> for GateMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if !self.gatekeeper.should_gate(req.uri().path()) {
            return Box::pin(async move { inner.call(req).await });
        }

        let verdict = self.gatekeeper.evaluate(&GateRequest::from_request(&req));

        Box::pin(async move {
            if let Some(principal) = verdict.principal {
                req.extensions_mut().insert(principal);
            }

            match verdict.decision {
                Decision::Proceed => inner.call(req).await,
                Decision::ProceedAndClearCookie(name) => {
                    let mut response = inner.call(req).await?;
                    match SetCookie::clear(name).to_header_value() {
                        Ok(value) => {
                            response.headers_mut().append(header::SET_COOKIE, value);
                        }
                        Err(e) => tracing::warn!(error = %e, "Could not clear loop guard cookie"),
                    }
                    Ok(response)
                }
                Decision::RedirectTo {
                    location,
                    set_cookie,
                } => Ok(redirect_response(&location, set_cookie.as_ref())
                    .unwrap_or_else(IntoResponse::into_response)),
            }
        })
    }
}

/// Builds a `307 Temporary Redirect` with an optional `Set-Cookie`.
pub fn redirect_response(location: &str, set_cookie: Option<&SetCookie>) -> GateResult<Response> {
    let location = HeaderValue::from_str(location)
        .map_err(|e| GateError::internal(format!("Invalid redirect location: {}", e)))?;

    let mut response = (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response();
    if let Some(cookie) = set_cookie {
        response
            .headers_mut()
            .append(header::SET_COOKIE, cookie.to_header_value()?);
    }
    Ok(response)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, JwtManager, Principal};
    use crate::config::GateConfig;
    use axum::{Extension, Router, routing::get};
    use tower::ServiceExt;

    const SECRET: &str = "middleware-unit-test-secret-0123456789";

    fn app() -> Router {
        let gatekeeper = Gatekeeper::from_config(&GateConfig::new(SECRET)).unwrap();

        Router::new()
            .route("/courses", get(|| async { "courses" }))
            .route(
                "/whoami",
                get(|Extension(principal): Extension<Principal>| async move { principal.id }),
            )
            .route("/login", get(|| async { "login" }))
            .route("/_next/static/app.js", get(|| async { "js" }))
            .layer(GateLayer::new(gatekeeper))
    }

    fn request(path: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_redirect_sets_guard_cookie() {
        let response = app().oneshot(request("/courses", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        assert_eq!(
            response.headers()[header::SET_COOKIE],
            "redirect_attempt=true; Path=/; Max-Age=60; SameSite=Lax"
        );
    }

    #[tokio::test]
    async fn test_guard_cookie_cleared_on_pass_through() {
        let response = app()
            .oneshot(request("/courses", Some("redirect_attempt=true")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::SET_COOKIE],
            "redirect_attempt=; Path=/; Max-Age=0"
        );
    }

    #[tokio::test]
    async fn test_principal_in_extensions() {
        let token = JwtManager::new(JwtConfig::new(SECRET))
            .unwrap()
            .mint("42", "admin", None, None)
            .unwrap();
        let cookie = format!("admin_token={}", token);

        let response = app().oneshot(request("/whoami", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_public_and_skipped_paths() {
        let login = app().oneshot(request("/login", None)).await.unwrap();
        assert_eq!(login.status(), StatusCode::OK);
        assert!(login.headers().get(header::SET_COOKIE).is_none());

        let asset = app().oneshot(request("/_next/static/app.js", None)).await.unwrap();
        assert_eq!(asset.status(), StatusCode::OK);
    }

    #[test]
    fn test_redirect_response_rejects_bad_location() {
        assert!(redirect_response("/bad\nlocation", None).is_err());
    }
}
