// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP handlers of the host server.

mod health;
mod page;
mod session;

pub use health::health;
pub use page::page;
pub use session::{logout, session};
