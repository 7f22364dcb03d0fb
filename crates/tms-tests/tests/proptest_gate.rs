// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Gate Properties
//!
//! - public prefixes bypass the gate whatever the cookies
//! - role labels are compared case-insensitively
//! - the gate never forwards an anonymous request to a non-public path

use std::sync::OnceLock;

use proptest::prelude::*;
use tms_gate::{Decision, Gatekeeper, Role, routes::DEFAULT_PUBLIC_PREFIXES};
use tms_tests::prelude::*;

fn gate() -> &'static Gatekeeper {
    static GATE: OnceLock<Gatekeeper> = OnceLock::new();
    GATE.get_or_init(GateFixtures::gatekeeper)
}

fn mixed_case(label: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), label.len()).prop_map(move |upper| {
        label
            .chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn public_prefix_always_proceeds(
        prefix in proptest::sample::select(DEFAULT_PUBLIC_PREFIXES.to_vec()),
        suffix in "[a-z0-9/._-]{0,24}",
        token in "[A-Za-z0-9._-]{0,64}",
        guard in proptest::option::of("[a-z]{0,5}"),
    ) {
        let path = format!("{}{}", prefix, suffix);
        let mut cookies = vec![("admin_token", token.as_str()), ("dashboard_token", token.as_str())];
        if let Some(guard) = guard.as_deref() {
            cookies.push(("redirect_attempt", guard));
        }

        prop_assert_eq!(gate().handle(&GateFixtures::request(&path, &cookies)), Decision::Proceed);
    }

    #[test]
    fn role_label_case_does_not_matter(
        (role, label) in prop_oneof![
            mixed_case("admin").prop_map(|l| (Role::Admin, l)),
            mixed_case("instructor").prop_map(|l| (Role::Instructor, l)),
            mixed_case("participant").prop_map(|l| (Role::Participant, l)),
        ],
        path in proptest::sample::select(vec!["/dashboard", "/attendance", "/my-courses", "/user/1"]),
    ) {
        let mixed = TokenFixtures::token("1", &label);
        let lower = TokenFixtures::token("1", role.as_str());

        let with_mixed = gate().evaluate(&GateFixtures::request(path, &[("dashboard_token", mixed.as_str())]));
        let with_lower = gate().evaluate(&GateFixtures::request(path, &[("dashboard_token", lower.as_str())]));

        prop_assert_eq!(&with_mixed.decision, &with_lower.decision);
        prop_assert_eq!(with_mixed.principal.map(|p| p.role), Some(role));
    }

    #[test]
    fn anonymous_requests_never_proceed_to_protected_paths(
        segment in "[a-z][a-z0-9-]{0,16}",
        junk in "[A-Za-z0-9]{0,32}",
    ) {
        let path = format!("/{}", segment);
        prop_assume!(!DEFAULT_PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)));

        let decision = gate().handle(&GateFixtures::request(&path, &[("admin_token", junk.as_str())]));
        prop_assert_eq!(decision.location(), Some("/login"));
    }
}
