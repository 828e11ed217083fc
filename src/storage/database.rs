// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded card and user database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `cards`: card id → serialized Card
//! - `users`: user id → serialized UserRecord
//! - `username_index`: username → user id
//! - `sequences`: sequence name → last assigned id
//!
//! redb admits one write transaction at a time, so a card unit of work is a
//! write transaction held open until commit.

use std::path::Path;

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::de::DeserializeOwned;

use super::{
    Card, CardId, CardRepository, CardUnitOfWork, CredentialStore, NewCard, NewUser,
    StorageError, StorageResult, UserId, UserRecord,
};

// =============================================================================
// Table Definitions
// =============================================================================

const CARDS: TableDefinition<u64, &[u8]> = TableDefinition::new("cards");

const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Unique username → user id.
const USERNAME_INDEX: TableDefinition<&str, u64> = TableDefinition::new("username_index");

const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const CARD_SEQUENCE: &str = "cards";
const USER_SEQUENCE: &str = "users";

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Advance a named sequence inside `txn` and return the new value.
fn next_sequence(txn: &WriteTransaction, name: &str) -> StorageResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let current = table.get(name)?.map(|v| v.value()).unwrap_or(0);
    let next = current + 1;
    table.insert(name, next)?;
    Ok(next)
}

// =============================================================================
// RedbStore
// =============================================================================

/// Embedded ACID store for cards and users.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CARDS)?;
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAME_INDEX)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn scan_cards(&self, owner: Option<&str>) -> StorageResult<Vec<Card>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARDS)?;
        let mut cards = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let card: Card = decode(value.value())?;
            if owner.is_none_or(|owner| card.owner == owner) {
                cards.push(card);
            }
        }
        Ok(cards)
    }
}

/// Card unit of work over a single redb write transaction.
struct RedbUnitOfWork {
    txn: WriteTransaction,
}

impl CardUnitOfWork for RedbUnitOfWork {
    fn load(&mut self, id: CardId) -> StorageResult<Option<Card>> {
        let table = self.txn.open_table(CARDS)?;
        let bytes = table.get(id)?.map(|v| v.value().to_vec());
        bytes.map(|b| decode(&b)).transpose()
    }

    fn save(&mut self, card: Card) -> StorageResult<()> {
        let json = serde_json::to_vec(&card)?;
        let mut table = self.txn.open_table(CARDS)?;
        table.insert(card.id, json.as_slice())?;
        Ok(())
    }

    fn commit(self: Box<Self>) -> StorageResult<()> {
        self.txn.commit()?;
        Ok(())
    }
}

impl CardRepository for RedbStore {
    fn find_card(&self, id: CardId) -> StorageResult<Option<Card>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARDS)?;
        let card = match table.get(id)? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        Ok(card)
    }

    fn find_by_owner(&self, owner: &str) -> StorageResult<Vec<Card>> {
        self.scan_cards(Some(owner))
    }

    fn list_cards(&self) -> StorageResult<Vec<Card>> {
        self.scan_cards(None)
    }

    fn insert_card(&self, card: NewCard) -> StorageResult<Card> {
        let write_txn = self.db.begin_write()?;
        let id = next_sequence(&write_txn, CARD_SEQUENCE)?;
        let card = card.into_card(id);
        let json = serde_json::to_vec(&card)?;
        {
            let mut table = write_txn.open_table(CARDS)?;
            table.insert(id, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(card)
    }

    fn delete_card(&self, id: CardId) -> StorageResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(CARDS)?;
            let removed = table.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    fn begin(&self) -> StorageResult<Box<dyn CardUnitOfWork + '_>> {
        Ok(Box::new(RedbUnitOfWork {
            txn: self.db.begin_write()?,
        }))
    }
}

impl CredentialStore for RedbStore {
    fn find_by_username(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USERNAME_INDEX)?;
        let Some(id) = index.get(username)?.map(|v| v.value()) else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        let user = match users.get(id)? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        Ok(user)
    }

    fn find_user(&self, id: UserId) -> StorageResult<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let user = match table.get(id)? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        Ok(user)
    }

    fn list_users(&self) -> StorageResult<Vec<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let mut users = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            users.push(decode(value.value())?);
        }
        Ok(users)
    }

    fn insert_user(&self, user: NewUser) -> StorageResult<UserRecord> {
        let write_txn = self.db.begin_write()?;
        let taken = {
            let index = write_txn.open_table(USERNAME_INDEX)?;
            let taken = index.get(user.username.as_str())?.is_some();
            taken
        };
        if taken {
            // Dropping the write transaction aborts it
            return Err(StorageError::AlreadyExists(format!("User {}", user.username)));
        }

        let id = next_sequence(&write_txn, USER_SEQUENCE)?;
        let record = UserRecord {
            id,
            username: user.username,
            password_hash: user.password_hash,
            roles: user.roles,
        };
        let json = serde_json::to_vec(&record)?;
        {
            let mut users = write_txn.open_table(USERS)?;
            users.insert(id, json.as_slice())?;
            let mut index = write_txn.open_table(USERNAME_INDEX)?;
            index.insert(record.username.as_str(), id)?;
        }
        write_txn.commit()?;
        Ok(record)
    }

    fn delete_user(&self, id: UserId) -> StorageResult<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut users = write_txn.open_table(USERS)?;
            let bytes = users.remove(id)?.map(|v| v.value().to_vec());
            bytes
        };
        let existed = match removed {
            Some(bytes) => {
                let record: UserRecord = decode(&bytes)?;
                let mut index = write_txn.open_table(USERNAME_INDEX)?;
                index.remove(record.username.as_str())?;
                true
            }
            None => false,
        };
        write_txn.commit()?;
        Ok(existed)
    }
}

// =============================================================================
// Tests
// =============================================================================
