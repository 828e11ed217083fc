// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Engine
//!
//! Balance and status changes on cards.
//!
//! Every mutation runs inside one [`CardUnitOfWork`](crate::storage::CardUnitOfWork):
//! checks read through the unit of work, writes are staged, and nothing is
//! visible until commit. A failed check returns before commit, so the unit of
//! work is dropped and nothing is written.
//!
//! Ownership is checked by loading the card and filtering on the owner name.
//! An absent card and a foreign card both give `OwnershipViolation`.
//!
//! A blocked card still takes part in transfers: status gates nothing here
//! besides itself.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::error::{LedgerError, LedgerResult};
use crate::storage::{Card, CardId, CardRepository, CardStatus, OwnershipCheck};

#[derive(Clone)]
pub struct LedgerEngine {
    cards: Arc<dyn CardRepository>,
}

impl LedgerEngine {
    pub fn new(cards: Arc<dyn CardRepository>) -> Self {
        Self { cards }
    }

    /// Admin status change. Setting the current status again is a no-op
    /// write, not an error.
    pub fn set_status(&self, card_id: CardId, status: CardStatus) -> LedgerResult<Card> {
        let mut uow = self.cards.begin()?;
        let mut card = uow
            .load(card_id)?
            .ok_or(LedgerError::CardNotFound(card_id))?;

        let previous = card.status;
        card.status = status;
        uow.save(card.clone())?;
        uow.commit()?;

        tracing::info!(card_id, from = %previous, to = %status, "Card status set");
        Ok(card)
    }

    pub fn activate(&self, card_id: CardId) -> LedgerResult<Card> {
        self.set_status(card_id, CardStatus::Active)
    }

    pub fn block(&self, card_id: CardId) -> LedgerResult<Card> {
        self.set_status(card_id, CardStatus::Blocked)
    }

    /// Owner-initiated block.
    pub fn request_block(&self, username: &str, card_id: CardId) -> LedgerResult<Card> {
        let mut uow = self.cards.begin()?;
        let mut card = uow
            .load(card_id)?
            .owned_by(username)
            .ok_or(LedgerError::OwnershipViolation)?;

        card.status = CardStatus::Blocked;
        uow.save(card.clone())?;
        uow.commit()?;

        tracing::info!(card_id, username = %username, "Card blocked by owner");
        Ok(card)
    }

    /// Balance of an owned card as exact decimal text.
    pub fn read_balance(&self, username: &str, card_id: CardId) -> LedgerResult<String> {
        let card = self
            .cards
            .find_card(card_id)?
            .owned_by(username)
            .ok_or(LedgerError::OwnershipViolation)?;
        Ok(card.balance.to_string())
    }

    /// Move `amount` between two cards owned by `username`.
    ///
    /// Checks, in order: positive amount, distinct cards, source owned,
    /// destination owned, sufficient funds. Both balances are saved in the
    /// same unit of work.
    pub fn transfer(
        &self,
        username: &str,
        from_id: CardId,
        to_id: CardId,
        amount: Decimal,
    ) -> LedgerResult<()> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        if from_id == to_id {
            return Err(LedgerError::SameCardTransfer);
        }

        let mut uow = self.cards.begin()?;
        let mut from = uow
            .load(from_id)?
            .owned_by(username)
            .ok_or(LedgerError::OwnershipViolation)?;
        let mut to = uow
            .load(to_id)?
            .owned_by(username)
            .ok_or(LedgerError::OwnershipViolation)?;

        if from.balance < amount {
            tracing::info!(from_id, to_id, "Transfer rejected: insufficient funds");
            return Err(LedgerError::InsufficientFunds);
        }

        from.balance -= amount;
        to.balance = to
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;

        uow.save(from)?;
        uow.save(to)?;
        uow.commit()?;

        tracing::info!(from_id, to_id, amount = %amount, username = %username, "Transfer completed");
        Ok(())
    }
}
