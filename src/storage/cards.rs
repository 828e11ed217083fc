// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card records and the card repository seam.
//!
//! ## Atomicity
//!
//! Every balance- or status-changing operation goes through a
//! [`CardUnitOfWork`]. A unit of work holds the repository's single writer
//! slot from [`CardRepository::begin`] until it is committed or dropped:
//!
//! - reads through the unit of work see its own staged writes
//! - staged writes become visible to others only on [`CardUnitOfWork::commit`]
//! - dropping without commit discards every staged write
//!
//! Two transfers sharing a card therefore serialize, and neither can act on a
//! balance the other has already spent.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ownership::OwnedResource;
use super::StorageResult;

pub type CardId = u64;

/// Card status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardStatus {
    /// Card can be used
    Active,
    /// Card is blocked by its owner or an admin
    Blocked,
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardStatus::Active => f.write_str("ACTIVE"),
            CardStatus::Blocked => f.write_str("BLOCKED"),
        }
    }
}

/// Stored card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Username of the owning user
    pub owner: String,
    /// Card number as produced by the card codec (never the plaintext)
    pub encrypted_number: String,
    pub expiration_date: NaiveDate,
    pub status: CardStatus,
    /// Exact decimal balance, never negative
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
}

impl OwnedResource for Card {
    fn owner_username(&self) -> &str {
        &self.owner
    }
}

/// A card about to be inserted; the repository assigns the id.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub owner: String,
    pub encrypted_number: String,
    pub expiration_date: NaiveDate,
}

impl NewCard {
    /// Materialize with the assigned id: new cards start active and empty.
    pub fn into_card(self, id: CardId) -> Card {
        Card {
            id,
            owner: self.owner,
            encrypted_number: self.encrypted_number,
            expiration_date: self.expiration_date,
            status: CardStatus::Active,
            balance: Decimal::ZERO,
        }
    }
}

/// Atomic read-modify-write scope over cards.
pub trait CardUnitOfWork {
    /// Read a card, including writes staged in this unit of work.
    fn load(&mut self, id: CardId) -> StorageResult<Option<Card>>;

    /// Stage a write of `card`.
    fn save(&mut self, card: Card) -> StorageResult<()>;

    /// Apply all staged writes at once.
    fn commit(self: Box<Self>) -> StorageResult<()>;
}

/// Card persistence used by the ledger.
pub trait CardRepository: Send + Sync {
    fn find_card(&self, id: CardId) -> StorageResult<Option<Card>>;

    /// Cards of one owner, ordered by id.
    fn find_by_owner(&self, owner: &str) -> StorageResult<Vec<Card>>;

    /// All cards, ordered by id.
    fn list_cards(&self) -> StorageResult<Vec<Card>>;

    fn insert_card(&self, card: NewCard) -> StorageResult<Card>;

    /// Delete a card; returns whether it existed.
    fn delete_card(&self, id: CardId) -> StorageResult<bool>;

    /// Open a unit of work, waiting for any other one to finish first.
    fn begin(&self) -> StorageResult<Box<dyn CardUnitOfWork + '_>>;
}
