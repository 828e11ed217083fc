// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Module
//!
//! Card lifecycle and money movement:
//!
//! - [`LedgerEngine`]: status changes, owner block requests, balance reads
//!   and transfers between a user's own cards
//! - [`CardService`]: provisioning, lookups and paged listings
//!
//! Balances are `rust_decimal::Decimal`, never floating point, and never go
//! below zero. No transfer history is kept.

pub mod engine;
pub mod error;
pub mod provisioning;

pub use engine::LedgerEngine;
pub use error::{LedgerError, LedgerResult};
pub use provisioning::{CardService, Page, MAX_PAGE_SIZE};
