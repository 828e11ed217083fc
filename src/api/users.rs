// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User management endpoints (admin only).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::{CreateUserRequest, UserResponse},
    state::AppState,
    storage::UserId,
};

/// Create a user with explicit roles.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Blank fields or empty roles"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn create_user(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .accounts
        .create_user(&request.username, &request.password, request.roles)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.accounts.list_users()?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = u64, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(state.accounts.get_user(id)?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = u64, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still owns cards")
    )
)]
pub async fn delete_user(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    state.accounts.delete_user(id)?;
    Ok(StatusCode::NO_CONTENT)
}
