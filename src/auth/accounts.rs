// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration, login and admin user management.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use super::password::{PasswordError, PasswordVerifier};
use super::token::TokenService;
use super::{AuthError, Role};
use crate::config::SeedAdmin;
use crate::storage::{
    CardRepository, CredentialStore, NewUser, StorageError, UserId, UserRecord,
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("user {0} already exists")]
    UserAlreadyExists(String),

    #[error("user not found")]
    UserNotFound,

    #[error("invalid password")]
    InvalidPassword,

    #[error("user {username} still owns {cards} card(s)")]
    UserHasCards { username: String, cards: usize },

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] AuthError),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for AccountError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists(name) => AccountError::UserAlreadyExists(name),
            other => AccountError::Storage(other),
        }
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), AccountError> {
    if value.trim().is_empty() {
        return Err(AccountError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

/// User account service.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn CredentialStore>,
    cards: Arc<dyn CardRepository>,
    passwords: Arc<dyn PasswordVerifier>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        cards: Arc<dyn CardRepository>,
        passwords: Arc<dyn PasswordVerifier>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            cards,
            passwords,
            tokens,
        }
    }

    /// Self-service registration; new accounts get the `USER` role only.
    pub fn register(&self, username: &str, password: &str) -> Result<UserRecord, AccountError> {
        self.create_user(username, password, [Role::User].into_iter().collect())
    }

    /// Check credentials and issue a token carrying the stored roles.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AccountError> {
        let user = self
            .users
            .find_by_username(username)?
            .ok_or(AccountError::UserNotFound)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::info!(username = %username, "Login rejected: wrong password");
            return Err(AccountError::InvalidPassword);
        }

        let token = self.tokens.issue(&user.username, &user.roles)?;
        tracing::info!(username = %user.username, "Login succeeded");
        Ok(token)
    }

    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        roles: BTreeSet<Role>,
    ) -> Result<UserRecord, AccountError> {
        require_non_blank("username", username)?;
        require_non_blank("password", password)?;
        if roles.is_empty() {
            return Err(AccountError::Validation("roles must not be empty".to_string()));
        }
        if self.users.exists_by_username(username)? {
            return Err(AccountError::UserAlreadyExists(username.to_string()));
        }

        let record = self.users.insert_user(NewUser {
            username: username.to_string(),
            password_hash: self.passwords.hash(password)?,
            roles,
        })?;
        tracing::info!(user_id = record.id, username = %record.username, "User created");
        Ok(record)
    }

    pub fn list_users(&self) -> Result<Vec<UserRecord>, AccountError> {
        Ok(self.users.list_users()?)
    }

    pub fn get_user(&self, id: UserId) -> Result<UserRecord, AccountError> {
        self.users.find_user(id)?.ok_or(AccountError::UserNotFound)
    }

    /// Delete a user who owns no cards.
    ///
    /// Cards are owned by username, so a user with cards stays: a later
    /// account registered under the same name would otherwise own them.
    pub fn delete_user(&self, id: UserId) -> Result<(), AccountError> {
        let user = self.users.find_user(id)?.ok_or(AccountError::UserNotFound)?;
        let cards = self.cards.find_by_owner(&user.username)?.len();
        if cards > 0 {
            return Err(AccountError::UserHasCards {
                username: user.username,
                cards,
            });
        }
        if !self.users.delete_user(id)? {
            return Err(AccountError::UserNotFound);
        }
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Create the configured admin account unless a user of that name exists.
    ///
    /// Returns whether an account was created.
    pub fn ensure_admin(&self, seed: &SeedAdmin) -> Result<bool, AccountError> {
        if self.users.exists_by_username(&seed.username)? {
            return Ok(false);
        }
        self.create_user(
            &seed.username,
            &seed.password,
            [Role::User, Role::Admin].into_iter().collect(),
        )?;
        Ok(true)
    }
}
