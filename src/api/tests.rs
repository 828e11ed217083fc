// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end router tests over an in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::router;
use crate::auth::{Argon2Verifier, Role};
use crate::config::{AppConfig, CARD_SECRET_ENV, JWT_SECRET_ENV};
use crate::state::AppState;
use crate::storage::{CardId, CardRepository, InMemoryStore};

struct TestApp {
    router: Router,
    state: AppState,
    store: Arc<InMemoryStore>,
}

fn test_app() -> TestApp {
    let config = AppConfig::from_lookup(|key| match key {
        JWT_SECRET_ENV => Some("0123456789abcdef0123456789abcdef".to_string()),
        CARD_SECRET_ENV => Some("card-secret-16-bytes".to_string()),
        _ => None,
    })
    .unwrap();
    let store = Arc::new(InMemoryStore::new());
    let passwords = Arc::new(Argon2Verifier::with_params(8, 1, 1).unwrap());
    let state = AppState::new(&config, store.clone(), store.clone(), passwords);

    state
        .accounts
        .create_user("admin", "admin-pass", [Role::Admin].into_iter().collect())
        .unwrap();

    TestApp {
        router: router(state.clone()),
        state,
        store,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn register_and_login(&self, username: &str) -> String {
        let (status, _) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "username": username, "password": "secret-pass" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(username, "secret-pass").await
    }

    async fn issue_card(&self, admin: &str, owner: &str, number: &str) -> CardId {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/cards",
                Some(admin),
                Some(json!({
                    "owner": owner,
                    "card_number": number,
                    "expiration_date": "2099-12-31"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "card creation failed: {body}");
        body["id"].as_u64().unwrap()
    }

    fn fund(&self, id: CardId, balance: &str) {
        let mut uow = self.store.begin().unwrap();
        let mut card = uow.load(id).unwrap().unwrap();
        card.balance = balance.parse().unwrap();
        uow.save(card).unwrap();
        uow.commit().unwrap();
    }
}

#[tokio::test]
async fn router_builds_with_all_routes() {
    let app = test_app();
    let _ = app.router.into_make_service();
}

#[tokio::test]
async fn health_and_docs_need_no_token() {
    let app = test_app();

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app
        .send(Method::GET, "/v3/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/cards/transfer"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let app = test_app();

    let (status, body) = app.send(Method::GET, "/api/cards", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "unauthenticated");

    let (status, _) = app
        .send(Method::GET, "/api/cards", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_rejects_duplicates_and_blank_fields() {
    let app = test_app();
    app.register_and_login("alice").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": "alice", "password": "other" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "user_already_exists");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": "  ", "password": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_are_reported() {
    let app = test_app();
    app.register_and_login("alice").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_password");
    assert!(body.get("token").is_none());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "nobody", "password": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "user_not_found");
}

#[tokio::test]
async fn roles_gate_admin_and_user_routes() {
    let app = test_app();
    let alice = app.register_and_login("alice").await;
    let admin = app.login("admin", "admin-pass").await;

    let (status, body) = app
        .send(Method::GET, "/api/cards/all", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "insufficient_permissions");

    let (status, _) = app.send(Method::GET, "/api/users", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin without the USER role cannot use holder routes.
    let (status, _) = app.send(Method::GET, "/api/cards", Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::GET, "/api/cards/all", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn deleted_user_token_stops_working() {
    let app = test_app();
    let alice = app.register_and_login("alice").await;
    let admin = app.login("admin", "admin-pass").await;
    let id = app
        .state
        .accounts
        .list_users()
        .unwrap()
        .into_iter()
        .find(|u| u.username == "alice")
        .unwrap()
        .id;

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/users/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(Method::GET, "/api/cards", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn card_owner_deletion_is_refused() {
    let app = test_app();
    app.register_and_login("alice").await;
    let admin = app.login("admin", "admin-pass").await;
    let card = app.issue_card(&admin, "alice", "4111222233334444").await;
    app.fund(card, "500");
    let id = app
        .state
        .accounts
        .list_users()
        .unwrap()
        .into_iter()
        .find(|u| u.username == "alice")
        .unwrap()
        .id;

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/users/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "user_has_cards");

    // The name stays taken, so nobody else can claim the card.
    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": "alice", "password": "attacker" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/cards/{card}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .send(Method::DELETE, &format!("/api/users/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn card_lifecycle_and_transfer() {
    let app = test_app();
    let alice = app.register_and_login("alice").await;
    let admin = app.login("admin", "admin-pass").await;

    let first = app.issue_card(&admin, "alice", "4111222233334444").await;
    let second = app.issue_card(&admin, "alice", "5500000000000004").await;
    app.fund(first, "100.00");

    let (status, body) = app
        .send(Method::GET, "/api/cards?page=0&size=10", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_elements"], 2);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["content"][0]["masked_number"], "**** **** **** 4444");
    assert_eq!(body["content"][0]["status"], "ACTIVE");
    assert_eq!(body["content"][0]["balance"], "100.00");
    assert!(!body.to_string().contains("4111222233334444"));

    let (status, body) = app
        .send(
            Method::POST,
            "/api/cards/transfer",
            Some(&alice),
            Some(json!({ "from_card_id": first, "to_card_id": second, "amount": "30.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "transfer failed: {body}");

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/cards/{first}/balance"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "70.00");

    let (_, body) = app
        .send(
            Method::GET,
            &format!("/api/cards/{second}/balance"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(body["balance"], "30.00");
}

#[tokio::test]
async fn transfer_accepts_numeric_amount() {
    let app = test_app();
    let alice = app.register_and_login("alice").await;
    let admin = app.login("admin", "admin-pass").await;
    let first = app.issue_card(&admin, "alice", "4111222233334444").await;
    let second = app.issue_card(&admin, "alice", "5500000000000004").await;
    app.fund(first, "100.00");

    let request: Value = serde_json::from_str(&format!(
        r#"{{"from_card_id":{first},"to_card_id":{second},"amount":12.50}}"#
    ))
    .unwrap();
    let (status, body) = app
        .send(Method::POST, "/api/cards/transfer", Some(&alice), Some(request))
        .await;
    assert_eq!(status, StatusCode::OK, "transfer failed: {body}");

    let (_, body) = app
        .send(
            Method::GET,
            &format!("/api/cards/{second}/balance"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(body["balance"], "12.50");
}

#[tokio::test]
async fn transfer_failures_leave_balances_untouched() {
    let app = test_app();
    let alice = app.register_and_login("alice").await;
    let admin = app.login("admin", "admin-pass").await;
    let first = app.issue_card(&admin, "alice", "4111222233334444").await;
    let second = app.issue_card(&admin, "alice", "5500000000000004").await;
    app.fund(first, "10.00");

    let cases = [
        (json!({ "from_card_id": first, "to_card_id": second, "amount": "10.01" }), "insufficient_funds"),
        (json!({ "from_card_id": first, "to_card_id": first, "amount": "1" }), "same_card_transfer"),
        (json!({ "from_card_id": first, "to_card_id": second, "amount": "0" }), "invalid_amount"),
    ];
    for (request, code) in cases {
        let (status, body) = app
            .send(Method::POST, "/api/cards/transfer", Some(&alice), Some(request))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], code);
    }

    assert_eq!(
        app.store.find_card(first).unwrap().unwrap().balance.to_string(),
        "10.00"
    );
    assert!(app.store.find_card(second).unwrap().unwrap().balance.is_zero());
}

#[tokio::test]
async fn foreign_cards_are_forbidden() {
    let app = test_app();
    let alice = app.register_and_login("alice").await;
    let bob = app.register_and_login("bob").await;
    let admin = app.login("admin", "admin-pass").await;
    let alice_card = app.issue_card(&admin, "alice", "4111222233334444").await;
    let bob_card = app.issue_card(&admin, "bob", "5500000000000004").await;
    app.fund(alice_card, "50");

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/cards/{alice_card}/balance"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "card_ownership");

    // Nonexistent and foreign cards answer alike.
    let (status, body) = app
        .send(Method::GET, "/api/cards/9999/balance", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "card_ownership");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/cards/transfer",
            Some(&alice),
            Some(json!({ "from_card_id": alice_card, "to_card_id": bob_card, "amount": "5" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.store.find_card(alice_card).unwrap().unwrap().balance.to_string(),
        "50"
    );
}

#[tokio::test]
async fn block_and_activate() {
    let app = test_app();
    let alice = app.register_and_login("alice").await;
    let bob = app.register_and_login("bob").await;
    let admin = app.login("admin", "admin-pass").await;
    let card = app.issue_card(&admin, "alice", "4111222233334444").await;

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/cards/{card}/request-block"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/cards/{card}/request-block"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "BLOCKED");

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/cards/{card}/activate"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE");

    let (status, _) = app
        .send(Method::POST, "/api/cards/9999/block", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn card_creation_validates_input() {
    let app = test_app();
    app.register_and_login("alice").await;
    let admin = app.login("admin", "admin-pass").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/cards",
            Some(&admin),
            Some(json!({ "owner": "alice", "card_number": "1234", "expiration_date": "2099-01-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "validation_error");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/cards",
            Some(&admin),
            Some(json!({ "owner": "alice", "card_number": "4111222233334444", "expiration_date": "2000-01-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/cards",
            Some(&admin),
            Some(json!({ "owner": "ghost", "card_number": "4111222233334444", "expiration_date": "2099-01-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "user_not_found");
}

#[tokio::test]
async fn paging_bounds_are_enforced() {
    let app = test_app();
    let alice = app.register_and_login("alice").await;
    let admin = app.login("admin", "admin-pass").await;
    for number in ["4111222233330001", "4111222233330002", "4111222233330003"] {
        app.issue_card(&admin, "alice", number).await;
    }

    let (status, body) = app
        .send(Method::GET, "/api/cards?page=1&size=2", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"].as_array().unwrap().len(), 1);
    assert_eq!(body["content"][0]["masked_number"], "**** **** **** 0003");
    assert_eq!(body["total_pages"], 2);

    let (status, _) = app
        .send(Method::GET, "/api/cards?size=0", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::GET, "/api/cards?size=101", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_manages_users() {
    let app = test_app();
    let admin = app.login("admin", "admin-pass").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/users",
            Some(&admin),
            Some(json!({ "username": "carol", "password": "pw", "roles": ["USER", "ADMIN"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["roles"], json!(["USER", "ADMIN"]));
    assert!(body.get("password_hash").is_none());
    let id = body["id"].as_u64().unwrap();

    let (status, body) = app
        .send(Method::GET, &format!("/api/users/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "carol");

    let (status, _) = app
        .send(Method::GET, "/api/users/9999", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
