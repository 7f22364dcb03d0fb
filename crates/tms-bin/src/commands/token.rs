// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `token` command.

use tms_gate::{CredentialSource, GateConfig, JwtManager};
use tracing::debug;

use crate::cli::{Cli, TokenArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::{gate_config, load_app_config};

/// Executes the `token` command: prints a signed credential.
pub fn token(cli: &Cli, args: TokenArgs) -> BinResult<()> {
    let app = load_app_config(cli.config_path().as_deref())?;
    let gate = gate_config(&app)?;

    println!("{}", mint(&gate, &args)?);
    Ok(())
}

/// Mints a token for the requested source.
///
/// Returns `name=token` when `--cookie` is set, using the first cookie name
/// configured for the source.
pub fn mint(gate: &GateConfig, args: &TokenArgs) -> BinResult<String> {
    if args.subject.trim().is_empty() {
        return Err(BinError::usage("subject must not be empty"));
    }

    let source = CredentialSource::from(args.source);
    let mut settings = match source {
        CredentialSource::Session => gate
            .session
            .clone()
            .ok_or_else(|| BinError::config("auth.session_secret is required for session tokens"))?,
        _ => gate.jwt.clone(),
    };
    if let Some(expires_in) = args.expires_in {
        if expires_in <= 0 {
            return Err(BinError::usage("--expires-in must be greater than zero"));
        }
        settings.expiration_secs = expires_in;
    }

    let token = JwtManager::new(settings)?.mint(
        &args.subject,
        &args.role,
        args.email.as_deref(),
        args.name.as_deref(),
    )?;
    debug!(source = %source, subject = %args.subject, "Minted token");

    if !args.cookie {
        return Ok(token);
    }
    let names = gate.cookie_names_for(source);
    let name = names
        .first()
        .ok_or_else(|| BinError::config(format!("no cookie name configured for '{}'", source)))?;
    Ok(format!("{}={}", name, token))
}
