// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware for the host server.
//!
//! - [`GateLayer`]: runs the gatekeeper before every gated route
//! - [`request_id`]: assigns and echoes `x-request-id`

mod gate;
mod request_id;

pub use gate::{GateLayer, GateMiddleware, redirect_response};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id};
