// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Host server.
//!
//! # Middleware order (outermost first)
//!
//! 1. `TraceLayer` - request/response tracing
//! 2. `request_id` - assigns `x-request-id` and a span
//! 3. `TimeoutLayer` - request timeout
//! 4. `GateLayer` - the gatekeeper

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::error::{GateError, GateResult};
use crate::handlers;
use crate::middleware::{GateLayer, request_id};
use crate::state::AppState;

/// HTTP server hosting the gate in front of the application routes.
#[derive(Debug, Clone)]
pub struct GateServer {
    state: AppState,
}

impl GateServer {
    /// Creates a server around prepared state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Returns the state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Builds the router with the full middleware stack.
    pub fn router(&self) -> Router {
        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(request_id))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.state.config.server.request_timeout,
            ))
            .layer(GateLayer::new(self.state.gatekeeper.clone()));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/auth/session", get(handlers::session))
            .route("/api/auth/logout", post(handlers::logout))
            .fallback(handlers::page)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Returns the configured bind address.
    pub fn addr(&self) -> SocketAddr {
        self.state.config.server.socket_addr()
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> GateResult<()> {
        let addr = self.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GateError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> GateResult<()> {
        let local = listener.local_addr()?;
        let router = self.router();

        info!(addr = %local, "Gate server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GateError::internal(format!("Server error: {}", e)))?;

        info!("Gate server shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, JwtManager};
    use crate::config::GateConfig;
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const SECRET: &str = "server-unit-test-secret-0123456789abcdef";

    fn server() -> GateServer {
        GateServer::new(AppState::from_config(GateConfig::new(SECRET)).unwrap())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_session_without_credentials() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_CREDENTIAL");
    }

    #[tokio::test]
    async fn test_session_with_credentials() {
        let token = JwtManager::new(JwtConfig::new(SECRET))
            .unwrap()
            .mint("8", "Instructor", Some("i@example.com"), Some("Ines"))
            .unwrap();

        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/session")
                    .header(header::COOKIE, format!("dashboard_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["id"], "8");
        assert_eq!(body["user"]["role"], "instructor");
        assert_eq!(body["source"], "dashboard");
    }

    #[tokio::test]
    async fn test_logout_clears_cookies() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cleared: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert!(cleared.contains(&"admin_token=; Path=/; Max-Age=0; HttpOnly".to_string()));
        assert!(cleared.contains(&"redirect_attempt=; Path=/; Max-Age=0; HttpOnly".to_string()));
    }

    #[tokio::test]
    async fn test_gated_page_redirects() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/courses").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_serve_and_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(server().serve(listener, async {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        assert!(handle.await.unwrap().is_ok());
    }
}
