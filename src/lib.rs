// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bank Cards - Card Management Service
//!
//! REST backend for issuing bank cards, blocking them and moving money
//! between a holder's own cards. Card numbers are stored encrypted and are
//! only ever shown masked.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token issuance, request authentication and role checks
//! - `crypto` - Card number encryption and masking
//! - `ledger` - Card provisioning, status changes and transfers
//! - `storage` - Card and credential stores (in-memory or redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
