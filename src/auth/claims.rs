// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::roles::{parse_role_claim, Role};
use crate::storage::UserId;

/// Claims carried by an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the username
    pub sub: String,

    /// Role names joined by `,` (e.g. `USER,ADMIN`)
    pub roles: String,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds, exclusive)
    pub exp: i64,
}

impl TokenClaims {
    /// Known roles in the `roles` claim; unknown names are dropped.
    pub fn role_set(&self) -> BTreeSet<Role> {
        parse_role_claim(&self.roles)
    }
}

/// Authenticated principal attached to a request.
///
/// Built per request from a validated token and the stored user; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,

    /// Username from the token subject
    pub username: String,

    /// Roles asserted by the token
    pub roles: BTreeSet<Role>,

    /// Granted authorities, e.g. `ROLE_ADMIN`
    pub authorities: Vec<String>,
}

impl AuthenticatedUser {
    pub fn new(user_id: UserId, username: impl Into<String>, roles: BTreeSet<Role>) -> Self {
        let authorities = roles.iter().map(Role::authority).collect();
        Self {
            user_id,
            username: username.into(),
            roles,
            authorities,
        }
    }

    /// Check if the user holds `role`. Roles have no hierarchy.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}
