// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use tms_config::AppConfig;
use tms_config::schema::duplicates;
use tms_gate::{GateConfig, Gatekeeper};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::{gate_config, load_app_config};

/// Executes the `validate` command.
///
/// Loads the configuration, bridges it and builds a gatekeeper, so every
/// startup check runs without binding a socket.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = cli.config_path();
    let source = config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(environment)".to_string());

    let app = load_app_config(config_path.as_deref())
        .map_err(|e| e.with_context("configuration validation failed"))?;
    let gate = gate_config(&app)?;
    let gatekeeper = Gatekeeper::from_config(&gate)?;

    let warnings = collect_warnings(&app, &gate);
    let sources: Vec<&str> = gatekeeper
        .resolver()
        .slots()
        .iter()
        .map(|slot| slot.source.as_str())
        .collect();

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", source);
            println!();
            println!("Summary:");
            println!("  Listen:            {}", gate.server.socket_addr());
            println!("  Credential chain:  {}", sources.join(" → "));
            println!("  Public prefixes:   {}", gate.routes.public_prefixes().len());
            println!("  Restricted rules:  {}", gate.routes.restricted_rules().len());
            println!("  Login page:        {}", gate.landing.login());
            println!(
                "  Loop guard:        {}",
                if gate.loop_guard.is_enabled() {
                    format!("{:?} ({})", gate.loop_guard.scope(), gate.loop_guard.cookie())
                } else {
                    "disabled".to_string()
                }
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&app)
                        .unwrap_or_else(|_| "(serialization error)".to_string())
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": source,
                "summary": {
                    "listen": gate.server.socket_addr().to_string(),
                    "credential_chain": sources,
                    "public_prefixes": gate.routes.public_prefixes(),
                    "restricted_rules": gate.routes.restricted_rules(),
                    "login": gate.landing.login(),
                    "loop_guard_enabled": gate.loop_guard.is_enabled(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&app) } else { None },
            });
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|e| BinError::runtime(format!("failed to render output: {}", e)))?;
            println!("{}", rendered);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Returns non-fatal findings about a configuration.
pub fn collect_warnings(app: &AppConfig, gate: &GateConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if gate.session.is_none() {
        warnings.push("auth.session_secret is not set: session cookies are ignored".to_string());
    }
    if !gate.loop_guard.is_enabled() {
        warnings.push("loop guard is disabled: redirect loops are not broken".to_string());
    }
    if !gate.server.secure_cookies {
        warnings.push("server.secure_cookies is off: cleared cookies are sent without Secure".to_string());
    }

    for (field, prefixes) in [
        ("routes.public", &app.routes.public),
        ("routes.admin", &app.routes.admin),
        ("routes.instructor", &app.routes.instructor),
        ("routes.participant", &app.routes.participant),
        ("routes.shared", &app.routes.shared),
    ] {
        for prefix in prefixes.as_deref().map(duplicates).unwrap_or_default() {
            warnings.push(format!("{} lists '{}' more than once", field, prefix));
        }
    }

    for rule in gate.routes.restricted_rules() {
        if gate.routes.is_public(&rule.prefix) {
            warnings.push(format!(
                "restricted prefix '{}' is shadowed by a public prefix and never enforced",
                rule.prefix
            ));
        }
    }

    warnings
}
