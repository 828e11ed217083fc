// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authenticate, Role},
    models::{
        BalanceResponse, CardPageResponse, CardResponse, CreateCardRequest, CreateUserRequest,
        CredentialsRequest, MessageResponse, TokenResponse, TransferRequest, UserResponse,
    },
    state::AppState,
    storage::CardStatus,
};

pub mod auth;
pub mod cards;
pub mod health;
pub mod users;

#[cfg(test)]
mod tests;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/cards",
            get(cards::list_my_cards).post(cards::create_card),
        )
        .route("/api/cards/all", get(cards::list_all_cards))
        .route("/api/cards/transfer", post(cards::transfer))
        .route(
            "/api/cards/{id}",
            get(cards::get_card).delete(cards::delete_card),
        )
        .route("/api/cards/{id}/activate", post(cards::activate_card))
        .route("/api/cards/{id}/block", post(cards::block_card))
        .route("/api/cards/{id}/request-block", post(cards::request_block))
        .route("/api/cards/{id}/balance", get(cards::get_balance))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/{id}",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/health", get(health::health))
        .layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            authenticate,
        ))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/v3/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Registers the `bearer_auth` scheme referenced by protected operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        cards::create_card,
        cards::list_all_cards,
        cards::get_card,
        cards::delete_card,
        cards::activate_card,
        cards::block_card,
        cards::list_my_cards,
        cards::request_block,
        cards::transfer,
        cards::get_balance,
        users::create_user,
        users::list_users,
        users::get_user,
        users::delete_user
    ),
    components(
        schemas(
            health::HealthResponse,
            CredentialsRequest,
            TokenResponse,
            MessageResponse,
            CardResponse,
            CardStatus,
            CreateCardRequest,
            TransferRequest,
            CardPageResponse,
            BalanceResponse,
            CreateUserRequest,
            UserResponse,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Auth", description = "Registration and token issuance"),
        (name = "Cards", description = "Card provisioning, status and transfers"),
        (name = "Users", description = "User management")
    )
)]
pub struct ApiDoc;
