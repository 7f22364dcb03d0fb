// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # TMS Integration Tests
//!
//! Shared fixtures and helpers for the integration suites.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tms-tests
//! cargo test -p tms-tests --test integration_gate
//! cargo test -p tms-tests --test integration_config
//! cargo test -p tms-tests --test proptest_gate
//! ```
//!
//! ## Test Suites
//!
//! - `integration_gate.rs`: gatekeeper decisions, the tower layer and the
//!   host router
//! - `integration_config.rs`: config files, placeholders and env overrides
//! - `proptest_gate.rs`: properties over generated paths and role labels

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::*;
}
