// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Fallback for application pages.

use axum::{Json, http::Uri};

use crate::extractors::OptionalPrincipal;
use crate::response::PageResponse;

/// Any path without a dedicated route.
///
/// Reports what the gate let through. Rendering the actual pages is the web
/// application's job.
pub async fn page(uri: Uri, OptionalPrincipal(principal): OptionalPrincipal) -> Json<PageResponse> {
    Json(PageResponse {
        path: uri.path().to_string(),
        principal,
    })
}
