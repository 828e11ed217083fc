// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store for tests and ephemeral deployments.
//!
//! Cards and users live in separate mutex-guarded tables. A card unit of work
//! holds the card table guard for its whole lifetime, which is the
//! single-writer discipline the ledger relies on.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{
    Card, CardId, CardRepository, CardUnitOfWork, CredentialStore, NewCard, NewUser,
    StorageError, StorageResult, UserId, UserRecord,
};

#[derive(Default)]
struct CardTable {
    next_id: CardId,
    rows: BTreeMap<CardId, Card>,
}

#[derive(Default)]
struct UserTable {
    next_id: UserId,
    rows: BTreeMap<UserId, UserRecord>,
}

#[derive(Default)]
pub struct InMemoryStore {
    cards: Mutex<CardTable>,
    users: Mutex<UserTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cards(&self) -> StorageResult<MutexGuard<'_, CardTable>> {
        self.cards.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn users(&self) -> StorageResult<MutexGuard<'_, UserTable>> {
        self.users.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

struct MemoryUnitOfWork<'a> {
    table: MutexGuard<'a, CardTable>,
    staged: BTreeMap<CardId, Card>,
}

impl CardUnitOfWork for MemoryUnitOfWork<'_> {
    fn load(&mut self, id: CardId) -> StorageResult<Option<Card>> {
        Ok(self
            .staged
            .get(&id)
            .or_else(|| self.table.rows.get(&id))
            .cloned())
    }

    fn save(&mut self, card: Card) -> StorageResult<()> {
        self.staged.insert(card.id, card);
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> StorageResult<()> {
        let staged = std::mem::take(&mut self.staged);
        self.table.rows.extend(staged);
        Ok(())
    }
}

impl CardRepository for InMemoryStore {
    fn find_card(&self, id: CardId) -> StorageResult<Option<Card>> {
        Ok(self.cards()?.rows.get(&id).cloned())
    }

    fn find_by_owner(&self, owner: &str) -> StorageResult<Vec<Card>> {
        Ok(self
            .cards()?
            .rows
            .values()
            .filter(|card| card.owner == owner)
            .cloned()
            .collect())
    }

    fn list_cards(&self) -> StorageResult<Vec<Card>> {
        Ok(self.cards()?.rows.values().cloned().collect())
    }

    fn insert_card(&self, card: NewCard) -> StorageResult<Card> {
        let mut table = self.cards()?;
        table.next_id += 1;
        let card = card.into_card(table.next_id);
        table.rows.insert(card.id, card.clone());
        Ok(card)
    }

    fn delete_card(&self, id: CardId) -> StorageResult<bool> {
        Ok(self.cards()?.rows.remove(&id).is_some())
    }

    fn begin(&self) -> StorageResult<Box<dyn CardUnitOfWork + '_>> {
        Ok(Box::new(MemoryUnitOfWork {
            table: self.cards()?,
            staged: BTreeMap::new(),
        }))
    }
}

impl CredentialStore for InMemoryStore {
    fn find_by_username(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        Ok(self
            .users()?
            .rows
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    fn find_user(&self, id: UserId) -> StorageResult<Option<UserRecord>> {
        Ok(self.users()?.rows.get(&id).cloned())
    }

    fn list_users(&self) -> StorageResult<Vec<UserRecord>> {
        Ok(self.users()?.rows.values().cloned().collect())
    }

    fn insert_user(&self, user: NewUser) -> StorageResult<UserRecord> {
        let mut table = self.users()?;
        if table.rows.values().any(|u| u.username == user.username) {
            return Err(StorageError::AlreadyExists(format!("User {}", user.username)));
        }
        table.next_id += 1;
        let record = UserRecord {
            id: table.next_id,
            username: user.username,
            password_hash: user.password_hash,
            roles: user.roles,
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    fn delete_user(&self, id: UserId) -> StorageResult<bool> {
        Ok(self.users()?.rows.remove(&id).is_some())
    }
}
