// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive `ToSchema`
//! (or `IntoParams` for query strings) for the OpenAPI document.
//!
//! Money crosses the wire as decimal strings (`"100.50"`), never as JSON
//! numbers, so no client float rounding touches a balance.
//!
//! ## Model Categories
//!
//! - **Auth**: credentials and issued tokens
//! - **Cards**: masked card views, provisioning, transfers, paging
//! - **Users**: admin user management

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::Role;
use crate::storage::{CardId, CardStatus, UserId, UserRecord};

// =============================================================================
// Auth Models
// =============================================================================

/// Username and password for registration or login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Bearer token returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed JWT to send as `Authorization: Bearer <token>`.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Card Models
// =============================================================================

/// Card as shown to clients. The number is always masked.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CardResponse {
    pub id: CardId,
    /// `**** **** **** 1234`
    pub masked_number: String,
    pub owner: String,
    pub expiration_date: NaiveDate,
    pub status: CardStatus,
    /// Exact decimal balance.
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(value_type = String, example = "100.50")]
    pub balance: Decimal,
}

/// Admin request to issue a card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCardRequest {
    /// Username of the owner; the user must exist.
    pub owner: String,
    /// Exactly 16 digits.
    #[schema(example = "4111222233334444")]
    pub card_number: String,
    /// Must be in the future.
    pub expiration_date: NaiveDate,
}

/// Transfer between two cards of the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub from_card_id: CardId,
    pub to_card_id: CardId,
    /// Positive decimal amount, as a string (`"30.00"`) or a JSON number
    /// (`30.00`). Numbers are read from their literal digits, never as floats.
    #[serde(
        deserialize_with = "rust_decimal::serde::arbitrary_precision::deserialize",
        serialize_with = "rust_decimal::serde::str::serialize"
    )]
    #[schema(value_type = String, example = "30.00")]
    pub amount: Decimal,
}

/// Query parameters for the caller's card listing.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CardPageQuery {
    /// Zero-based page index (default 0).
    pub page: Option<usize>,
    /// Page size, 1 to 100 (default 10).
    pub size: Option<usize>,
}

/// One page of the caller's cards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CardPageResponse {
    pub content: Vec<CardResponse>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

/// Balance of one card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub card_id: CardId,
    /// Exact decimal text, e.g. `100.50`.
    #[schema(example = "100.50")]
    pub balance: String,
}

// =============================================================================
// User Models
// =============================================================================

/// Admin request to create a user with explicit roles.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    /// Non-empty set of roles.
    pub roles: BTreeSet<Role>,
}

/// User as shown to admins. The password hash is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub roles: BTreeSet<Role>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            roles: user.roles,
        }
    }
}
