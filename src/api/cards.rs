// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card endpoints.
//!
//! Admin routes provision cards and change status. User routes act on the
//! caller's own cards only; a card owned by someone else answers exactly
//! like a card that does not exist.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{AdminOnly, UserOnly},
    error::ApiError,
    ledger::CardService,
    models::{
        BalanceResponse, CardPageQuery, CardPageResponse, CardResponse, CreateCardRequest,
        MessageResponse, TransferRequest,
    },
    state::AppState,
    storage::{Card, CardId},
};

const DEFAULT_PAGE_SIZE: usize = 10;

fn to_response(cards: &CardService, card: Card) -> Result<CardResponse, ApiError> {
    Ok(CardResponse {
        masked_number: cards.masked_number(&card)?,
        id: card.id,
        owner: card.owner,
        expiration_date: card.expiration_date,
        status: card.status,
        balance: card.balance,
    })
}

fn to_responses(cards: &CardService, list: Vec<Card>) -> Result<Vec<CardResponse>, ApiError> {
    list.into_iter().map(|card| to_response(cards, card)).collect()
}

// =============================================================================
// Admin
// =============================================================================

/// Issue a card to an existing user.
#[utoipa::path(
    post,
    path = "/api/cards",
    tag = "Cards",
    request_body = CreateCardRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Card created", body = CardResponse),
        (status = 400, description = "Invalid card number or expiration date"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "Owner does not exist")
    )
)]
pub async fn create_card(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardResponse>), ApiError> {
    tracing::debug!(admin = %admin.username, owner = %request.owner, "Creating card");
    let card = state.cards.create_card(
        &request.owner,
        &request.card_number,
        request.expiration_date,
    )?;
    Ok((StatusCode::CREATED, Json(to_response(&state.cards, card)?)))
}

/// List every card.
#[utoipa::path(
    get,
    path = "/api/cards/all",
    tag = "Cards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All cards", body = Vec<CardResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn list_all_cards(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<CardResponse>>, ApiError> {
    let cards = state.cards.list_all()?;
    Ok(Json(to_responses(&state.cards, cards)?))
}

#[utoipa::path(
    get,
    path = "/api/cards/{id}",
    tag = "Cards",
    params(("id" = u64, Path, description = "Card id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Card", body = CardResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn get_card(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<Json<CardResponse>, ApiError> {
    let card = state.cards.get_card(id)?;
    Ok(Json(to_response(&state.cards, card)?))
}

#[utoipa::path(
    delete,
    path = "/api/cards/{id}",
    tag = "Cards",
    params(("id" = u64, Path, description = "Card id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn delete_card(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<StatusCode, ApiError> {
    state.cards.delete_card(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/cards/{id}/activate",
    tag = "Cards",
    params(("id" = u64, Path, description = "Card id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Card active", body = CardResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn activate_card(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<Json<CardResponse>, ApiError> {
    let card = state.ledger.activate(id)?;
    Ok(Json(to_response(&state.cards, card)?))
}

#[utoipa::path(
    post,
    path = "/api/cards/{id}/block",
    tag = "Cards",
    params(("id" = u64, Path, description = "Card id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Card blocked", body = CardResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn block_card(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<Json<CardResponse>, ApiError> {
    let card = state.ledger.block(id)?;
    Ok(Json(to_response(&state.cards, card)?))
}

// =============================================================================
// Card holder
// =============================================================================

/// Page through the caller's cards.
#[utoipa::path(
    get,
    path = "/api/cards",
    tag = "Cards",
    params(CardPageQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's cards", body = CardPageResponse),
        (status = 400, description = "Page size out of range"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (user role required)")
    )
)]
pub async fn list_my_cards(
    UserOnly(user): UserOnly,
    State(state): State<AppState>,
    Query(query): Query<CardPageQuery>,
) -> Result<Json<CardPageResponse>, ApiError> {
    let page = state.cards.list_for_owner(
        &user.username,
        query.page.unwrap_or(0),
        query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;
    let total_pages = page.total_pages();

    Ok(Json(CardPageResponse {
        content: to_responses(&state.cards, page.items)?,
        page: page.page,
        size: page.size,
        total_elements: page.total_items,
        total_pages,
    }))
}

/// Block one of the caller's cards.
#[utoipa::path(
    post,
    path = "/api/cards/{id}/request-block",
    tag = "Cards",
    params(("id" = u64, Path, description = "Card id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Card blocked", body = CardResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Card is not the caller's")
    )
)]
pub async fn request_block(
    UserOnly(user): UserOnly,
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<Json<CardResponse>, ApiError> {
    let card = state.ledger.request_block(&user.username, id)?;
    Ok(Json(to_response(&state.cards, card)?))
}

/// Move money between two of the caller's cards.
#[utoipa::path(
    post,
    path = "/api/cards/transfer",
    tag = "Cards",
    request_body = TransferRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Transfer completed", body = MessageResponse),
        (status = 400, description = "Same card, non-positive amount or insufficient funds"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "A card is not the caller's")
    )
)]
pub async fn transfer(
    UserOnly(user): UserOnly,
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.ledger.transfer(
        &user.username,
        request.from_card_id,
        request.to_card_id,
        request.amount,
    )?;
    Ok(Json(MessageResponse::new("Transfer completed")))
}

#[utoipa::path(
    get,
    path = "/api/cards/{id}/balance",
    tag = "Cards",
    params(("id" = u64, Path, description = "Card id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Card balance", body = BalanceResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Card is not the caller's")
    )
)]
pub async fn get_balance(
    UserOnly(user): UserOnly,
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.ledger.read_balance(&user.username, id)?;
    Ok(Json(BalanceResponse {
        card_id: id,
        balance,
    }))
}
