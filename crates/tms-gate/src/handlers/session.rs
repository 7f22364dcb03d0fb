// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session endpoints.
//!
//! Both live under the public `/api/auth` prefix, so the gate never attaches
//! a principal for them; the session handler resolves credentials itself.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Request, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::cookies::SetCookie;
use crate::error::GateResult;
use crate::gatekeeper::GateRequest;
use crate::response::{LogoutResponse, SessionResponse};
use crate::state::AppState;

/// GET /api/auth/session
///
/// Returns the principal the credential cookies resolve to, or 401.
pub async fn session(State(state): State<AppState>, request: Request) -> GateResult<Json<SessionResponse>> {
    let principal = state
        .gatekeeper()
        .principal(&GateRequest::from_request(&request))?;

    tracing::debug!(subject = %principal.id, source = %principal.source, "Session resolved");
    Ok(Json(SessionResponse::from(principal)))
}

/// POST /api/auth/logout
///
/// Expires every credential cookie and the loop guard.
pub async fn logout(State(state): State<AppState>) -> GateResult<Response> {
    let gatekeeper = state.gatekeeper();
    let secure = state.config.server.secure_cookies;

    let mut cleared: Vec<String> = gatekeeper
        .resolver()
        .cookie_names()
        .map(str::to_string)
        .collect();
    if gatekeeper.loop_guard().is_enabled() {
        cleared.push(gatekeeper.loop_guard().cookie().to_string());
    }
    let mut seen = HashSet::new();
    cleared.retain(|name| seen.insert(name.clone()));

    let mut cookies = Vec::with_capacity(cleared.len());
    for name in &cleared {
        let mut cookie = SetCookie::clear(name.as_str()).http_only();
        // Browsers drop `__Secure-` cookies written without `Secure`.
        if secure || name.starts_with("__Secure-") {
            cookie = cookie.secure();
        }
        cookies.push(cookie.to_header_value()?);
    }

    tracing::info!(cookies = cleared.len(), "Logout, credential cookies cleared");

    let mut response = Json(LogoutResponse {
        success: true,
        cleared,
    })
    .into_response();
    for value in cookies {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}
