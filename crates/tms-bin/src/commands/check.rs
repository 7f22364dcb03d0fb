// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `check` command.

use serde::Serialize;
use tms_gate::{Decision, GateRequest, Gatekeeper, Principal, SetCookie};

use crate::cli::{CheckArgs, Cli, OutputFormat};
use crate::error::{BinError, BinResult};
use crate::runtime::{gate_config, load_app_config};

/// Outcome of an offline evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Evaluated path.
    pub path: String,
    /// `skip`, `proceed`, `proceed_and_clear_cookie` or `redirect`.
    pub decision: &'static str,
    /// Redirect target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// `Set-Cookie` value the response would carry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_cookie: Option<String>,
    /// Resolved principal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
}

/// Executes the `check` command.
pub fn check(cli: &Cli, args: CheckArgs) -> BinResult<()> {
    let app = load_app_config(cli.config_path().as_deref())?;
    let gatekeeper = Gatekeeper::from_config(&gate_config(&app)?)?;

    let report = evaluate(&gatekeeper, &args.path, &args.cookies)?;

    match args.format {
        OutputFormat::Text => {
            println!("path:       {}", report.path);
            println!("decision:   {}", report.decision);
            if let Some(location) = &report.location {
                println!("location:   {}", location);
            }
            if let Some(cookie) = &report.set_cookie {
                println!("set-cookie: {}", cookie);
            }
            match &report.principal {
                Some(p) => println!("principal:  {} ({}, via {})", p.id, p.role_label, p.source),
                None => println!("principal:  -"),
            }
        }
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&report)
                .map_err(|e| BinError::runtime(format!("failed to render output: {}", e)))?;
            println!("{}", rendered);
        }
    }
    Ok(())
}

/// Runs the gatekeeper for a path and `name=value` cookie pairs.
pub fn evaluate(gatekeeper: &Gatekeeper, path: &str, cookies: &[String]) -> BinResult<CheckReport> {
    let mut report = CheckReport {
        path: path.to_string(),
        decision: "skip",
        location: None,
        set_cookie: None,
        principal: None,
    };
    if !gatekeeper.should_gate(path) {
        return Ok(report);
    }

    let mut request = GateRequest::new(path);
    for cookie in cookies {
        let (name, value) = cookie
            .split_once('=')
            .ok_or_else(|| BinError::usage(format!("cookie '{}' is not name=value", cookie)))?;
        request = request.with_cookie(name.trim(), value.trim());
    }

    let verdict = gatekeeper.evaluate(&request);
    report.principal = verdict.principal;
    match verdict.decision {
        Decision::Proceed => report.decision = "proceed",
        Decision::ProceedAndClearCookie(name) => {
            report.decision = "proceed_and_clear_cookie";
            report.set_cookie = Some(SetCookie::clear(name).to_string());
        }
        Decision::RedirectTo { location, set_cookie } => {
            report.decision = "redirect";
            report.location = Some(location);
            report.set_cookie = set_cookie.map(|c| c.to_string());
        }
    }
    Ok(report)
}
