// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! This module provides:
//! - Token claims, signing and verification
//! - The ordered credential resolution chain
//! - Roles and the per-request principal

mod claims;
pub mod credential;
mod jwt;
mod principal;
mod role;
mod session;

pub use claims::{Claims, ClaimsBuilder};
pub use credential::{
    ClaimsDecoder, Credential, CredentialError, CredentialResolver, CredentialSlot,
    CredentialSource,
};
pub use jsonwebtoken::Algorithm;
pub use jwt::{JwtConfig, JwtManager};
pub use principal::Principal;
pub use role::Role;
pub use session::SessionDecoder;
