// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application roles.

use serde::{Deserialize, Serialize};

/// Roles known to the route table.
///
/// The label stored in a credential is free text; anything that does not
/// normalize to a known role becomes [`Role::Unknown`] rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office administrator.
    Admin,
    /// Course instructor.
    Instructor,
    /// Course participant.
    Participant,
    /// Authenticated, but with a label the table does not know.
    #[default]
    Unknown,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Instructor, Role::Participant, Role::Unknown];

    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Participant => "participant",
            Role::Unknown => "unknown",
        }
    }

    /// Normalizes a raw role label. Never fails.
    pub fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or(Role::Unknown)
    }

    /// Parses a role from a string, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "instructor" => Some(Role::Instructor),
            "participant" => Some(Role::Participant),
            "unknown" => Some(Role::Unknown),
            _ => None,
        }
    }

    /// Returns `true` for the three roles with their own landing page.
    pub fn is_known(&self) -> bool {
        !matches!(self, Role::Unknown)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
