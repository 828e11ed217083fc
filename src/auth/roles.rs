// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix turning a role name into a granted authority (`ADMIN` → `ROLE_ADMIN`).
pub const AUTHORITY_PREFIX: &str = "ROLE_";

/// Separator of role names inside the token `roles` claim.
///
/// Role names are a closed set of upper-case identifiers, so the separator is
/// never escaped.
pub const ROLE_CLAIM_SEPARATOR: char = ',';

/// User roles for authorization.
///
/// There is no hierarchy: an `Admin` that lacks `User` cannot reach
/// user-only endpoints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Card holder: owns cards, transfers between them
    User,
    /// Provisions cards and users, changes card status
    Admin,
}

/// Error returned when a role name is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Authority string granted for this role.
    pub fn authority(&self) -> String {
        format!("{AUTHORITY_PREFIX}{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join roles into the single delimited token claim.
pub fn join_role_claim(roles: &BTreeSet<Role>) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(&ROLE_CLAIM_SEPARATOR.to_string())
}

/// Parse the delimited token claim back into a role set.
///
/// An empty claim is an empty set, not an error. Unknown names are dropped
/// so they never grant authority.
pub fn parse_role_claim(claim: &str) -> BTreeSet<Role> {
    claim
        .split(ROLE_CLAIM_SEPARATOR)
        .filter(|name| !name.trim().is_empty())
        .filter_map(|name| name.parse().ok())
        .collect()
}
