// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger errors.

use thiserror::Error;

use crate::crypto::CodecError;
use crate::storage::{CardId, StorageError};

/// Errors raised by card operations.
///
/// Domain variants stay distinct all the way to the HTTP boundary. `Codec`
/// and `Storage` are internal failures whose detail is logged but never sent
/// to the caller.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("card {0} not found")]
    CardNotFound(CardId),

    /// Card is absent or owned by someone else; the two are not told apart.
    #[error("card does not belong to the current user")]
    OwnershipViolation,

    #[error("insufficient funds on the source card")]
    InsufficientFunds,

    #[error("source and destination cards must differ")]
    SameCardTransfer,

    #[error("transfer amount must be positive")]
    InvalidAmount,

    #[error("destination balance would overflow")]
    BalanceOverflow,

    #[error("{0}")]
    Validation(String),

    #[error("user {0} not found")]
    UserNotFound(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LedgerError {
    /// Internal failures, as opposed to domain rule violations.
    pub fn is_internal(&self) -> bool {
        matches!(self, LedgerError::Codec(_) | LedgerError::Storage(_))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
