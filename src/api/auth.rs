// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login. Both routes are allow-listed and need no token.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::ApiError,
    models::{CredentialsRequest, MessageResponse, TokenResponse},
    state::AppState,
};

/// Register a new account with the `USER` role.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Blank username or password"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .accounts
        .register(&request.username, &request.password)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered")),
    ))
}

/// Log in and receive a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Wrong password"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.accounts.login(&request.username, &request.password)?;
    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.lifetime().num_seconds(),
    }))
}
