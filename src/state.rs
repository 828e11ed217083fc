// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.
//!
//! Secrets from [`AppConfig`] are moved into the token service and the card
//! codec here, once, and shared read-only behind `Arc` afterwards.

use std::sync::Arc;

use crate::auth::{
    AccountService, Argon2Verifier, PasswordVerifier, RequestAuthenticator, TokenService,
};
use crate::config::AppConfig;
use crate::crypto::CardCodec;
use crate::ledger::{CardService, LedgerEngine};
use crate::storage::{CardRepository, CredentialStore, InMemoryStore, RedbStore, StorageResult};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub authenticator: RequestAuthenticator,
    pub accounts: AccountService,
    pub ledger: LedgerEngine,
    pub cards: CardService,
}

impl AppState {
    /// Wire services over the given stores.
    pub fn new(
        config: &AppConfig,
        cards: Arc<dyn CardRepository>,
        users: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordVerifier>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_lifetime));
        let codec = Arc::new(CardCodec::new(&config.card_secret));

        Self {
            authenticator: RequestAuthenticator::new(
                tokens.clone(),
                users.clone(),
                config.public_paths.iter().cloned(),
            ),
            accounts: AccountService::new(users.clone(), cards.clone(), passwords, tokens.clone()),
            ledger: LedgerEngine::new(cards.clone()),
            cards: CardService::new(cards, users, codec),
            tokens,
        }
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(config: &AppConfig, passwords: Arc<dyn PasswordVerifier>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(config, store.clone(), store, passwords)
    }

    /// State over the store selected by configuration: redb when `DATA_DIR`
    /// is set, in-memory otherwise.
    pub fn from_config(config: &AppConfig) -> StorageResult<Self> {
        let passwords: Arc<dyn PasswordVerifier> = Arc::new(Argon2Verifier::new());
        match config.database_path() {
            Some(path) => {
                tracing::info!(path = %path.display(), "Opening card database");
                let store = Arc::new(RedbStore::open(&path)?);
                Ok(Self::new(config, store.clone(), store, passwords))
            }
            None => {
                tracing::warn!("DATA_DIR not set, using in-memory store (data is lost on restart)");
                Ok(Self::in_memory(config, passwords))
            }
        }
    }
}
