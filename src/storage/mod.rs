// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for users and cards behind two seams, [`CredentialStore`] and
//! [`CardRepository`]. Two backends implement both:
//!
//! - [`InMemoryStore`]: mutex-guarded maps, used in tests and when no
//!   `DATA_DIR` is configured
//! - [`RedbStore`]: embedded ACID database (redb) under `DATA_DIR`
//!
//! Card numbers reach storage already encrypted by the card codec; this
//! module never sees plaintext numbers or secrets.

pub mod cards;
pub mod database;
pub mod memory;
pub mod ownership;
pub mod users;

pub use cards::{Card, CardId, CardRepository, CardStatus, CardUnitOfWork, NewCard};
pub use database::RedbStore;
pub use memory::InMemoryStore;
pub use ownership::{OwnedResource, OwnershipCheck};
pub use users::{CredentialStore, NewUser, UserId, UserRecord};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("storage lock poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
