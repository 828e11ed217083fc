// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User records and the credential store seam.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::StorageResult;
use crate::auth::Role;

pub type UserId = u64;

/// Stored user account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    /// Unique login name; also the owner key of cards
    pub username: String,
    /// PHC-format password hash (never returned via API)
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// A user about to be inserted; the store assigns the id.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

/// Credential store used by authentication and account management.
///
/// Implementations must be safe to call from concurrent requests.
pub trait CredentialStore: Send + Sync {
    /// Look a user up by exact username.
    fn find_by_username(&self, username: &str) -> StorageResult<Option<UserRecord>>;

    fn exists_by_username(&self, username: &str) -> StorageResult<bool> {
        Ok(self.find_by_username(username)?.is_some())
    }

    fn find_user(&self, id: UserId) -> StorageResult<Option<UserRecord>>;

    /// All users, ordered by id.
    fn list_users(&self) -> StorageResult<Vec<UserRecord>>;

    /// Insert a user.
    ///
    /// # Errors
    /// `StorageError::AlreadyExists` if the username is taken.
    fn insert_user(&self, user: NewUser) -> StorageResult<UserRecord>;

    /// Delete a user; returns whether it existed.
    fn delete_user(&self, id: UserId) -> StorageResult<bool>;
}
