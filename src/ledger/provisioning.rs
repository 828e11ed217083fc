// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card provisioning and lookup (admin and owner listings).

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use super::error::{LedgerError, LedgerResult};
use crate::crypto::CardCodec;
use crate::storage::{Card, CardId, CardRepository, CredentialStore, NewCard};

/// Card numbers are exactly this many ASCII digits.
pub const CARD_NUMBER_DIGITS: usize = 16;

pub const MAX_PAGE_SIZE: usize = 100;

/// One page of a listing, with zero-based `page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.size)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
        }
    }
}

fn validate_card_number(number: &str) -> LedgerResult<()> {
    if number.len() != CARD_NUMBER_DIGITS || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::Validation(format!(
            "card number must contain exactly {CARD_NUMBER_DIGITS} digits"
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CardService {
    cards: Arc<dyn CardRepository>,
    users: Arc<dyn CredentialStore>,
    codec: Arc<CardCodec>,
}

impl CardService {
    pub fn new(
        cards: Arc<dyn CardRepository>,
        users: Arc<dyn CredentialStore>,
        codec: Arc<CardCodec>,
    ) -> Self {
        Self {
            cards,
            users,
            codec,
        }
    }

    /// Issue a new card to an existing user.
    ///
    /// The number is encrypted before it reaches the repository.
    pub fn create_card(
        &self,
        owner: &str,
        number: &str,
        expiration_date: NaiveDate,
    ) -> LedgerResult<Card> {
        if owner.trim().is_empty() {
            return Err(LedgerError::Validation("owner must not be blank".to_string()));
        }
        validate_card_number(number)?;
        if expiration_date <= Utc::now().date_naive() {
            return Err(LedgerError::Validation(
                "expiration date must be in the future".to_string(),
            ));
        }
        if !self.users.exists_by_username(owner)? {
            return Err(LedgerError::UserNotFound(owner.to_string()));
        }

        let card = self.cards.insert_card(NewCard {
            owner: owner.to_string(),
            encrypted_number: self.codec.encrypt(number)?,
            expiration_date,
        })?;
        tracing::info!(card_id = card.id, owner = %card.owner, "Card created");
        Ok(card)
    }

    pub fn get_card(&self, id: CardId) -> LedgerResult<Card> {
        self.cards.find_card(id)?.ok_or(LedgerError::CardNotFound(id))
    }

    pub fn list_all(&self) -> LedgerResult<Vec<Card>> {
        Ok(self.cards.list_cards()?)
    }

    /// Page through the cards of `owner`, ordered by id.
    pub fn list_for_owner(&self, owner: &str, page: usize, size: usize) -> LedgerResult<Page<Card>> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(LedgerError::Validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let owned = self.cards.find_by_owner(owner)?;
        let total_items = owned.len();
        let items = owned
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .collect();

        Ok(Page {
            items,
            page,
            size,
            total_items,
        })
    }

    pub fn delete_card(&self, id: CardId) -> LedgerResult<()> {
        if !self.cards.delete_card(id)? {
            return Err(LedgerError::CardNotFound(id));
        }
        tracing::info!(card_id = id, "Card deleted");
        Ok(())
    }

    /// Masked plaintext number for display.
    pub fn masked_number(&self, card: &Card) -> LedgerResult<String> {
        Ok(self.codec.masked(&card.encrypted_number)?)
    }
}
