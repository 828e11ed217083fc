// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! First of the two auth stages: authenticate softly. For every request the
//! middleware either attaches an [`AuthenticatedUser`] to the request
//! extensions or attaches nothing, and always forwards. It never rejects;
//! access decisions belong to the extractors in `extractor.rs`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         authenticator.clone(),
//!         authenticate,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::token::TokenVerifier;
use super::AuthenticatedUser;
use crate::storage::CredentialStore;

const BEARER_PREFIX: &str = "Bearer ";

/// Per-request authenticator. Holds no mutable state.
#[derive(Clone)]
pub struct RequestAuthenticator {
    tokens: Arc<dyn TokenVerifier>,
    users: Arc<dyn CredentialStore>,
    public_paths: Arc<[String]>,
}

impl RequestAuthenticator {
    pub fn new(
        tokens: Arc<dyn TokenVerifier>,
        users: Arc<dyn CredentialStore>,
        public_paths: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            tokens,
            users,
            public_paths: public_paths.into_iter().collect(),
        }
    }

    /// Whether `path` falls under an allow-listed prefix.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Resolve the principal for a request's headers, if any.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<AuthenticatedUser> {
        let header = headers.get(AUTHORIZATION)?;
        let Ok(value) = header.to_str() else {
            tracing::debug!("Authorization header is not valid UTF-8");
            return None;
        };
        let Some(token) = value.strip_prefix(BEARER_PREFIX) else {
            tracing::debug!("Authorization header is not a bearer credential");
            return None;
        };
        let token = token.trim();

        // One decode: subject and roles come from the same clock reading.
        let claims = self.tokens.claims(token)?;
        let user = match self.users.find_by_username(&claims.sub) {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(username = %claims.sub, "Valid token for unknown user");
                return None;
            }
            Err(e) => {
                tracing::warn!(username = %claims.sub, error = %e, "User lookup failed during authentication");
                return None;
            }
        };

        Some(AuthenticatedUser::new(
            user.id,
            user.username,
            claims.role_set(),
        ))
    }
}

/// Authentication middleware function.
pub async fn authenticate(
    State(authenticator): State<RequestAuthenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    if authenticator.is_public(request.uri().path()) {
        return next.run(request).await;
    }

    if let Some(user) = authenticator.resolve(request.headers()) {
        tracing::debug!(username = %user.username, "Request authenticated");
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    use crate::auth::{Role, TokenClaims};
    use crate::storage::{InMemoryStore, NewUser};

    fn user_claims(username: &str) -> TokenClaims {
        TokenClaims {
            sub: username.to_string(),
            roles: "USER".to_string(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    /// Accepts exactly the token `good-<username>` and counts validations.
    #[derive(Default)]
    struct CountingVerifier {
        validations: AtomicUsize,
    }

    impl TokenVerifier for CountingVerifier {
        fn claims(&self, token: &str) -> Option<TokenClaims> {
            self.validations.fetch_add(1, Ordering::SeqCst);
            token.strip_prefix("good-").map(user_claims)
        }
    }

    /// Valid on the first check only, as if the token expired right after.
    #[derive(Default)]
    struct ExpiringVerifier {
        checks: AtomicUsize,
    }

    impl TokenVerifier for ExpiringVerifier {
        fn claims(&self, token: &str) -> Option<TokenClaims> {
            if self.checks.fetch_add(1, Ordering::SeqCst) > 0 {
                return None;
            }
            token.strip_prefix("good-").map(user_claims)
        }
    }

    fn store_with_alice() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_user(NewUser {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
                roles: [Role::User].into_iter().collect(),
            })
            .unwrap();
        store
    }

    fn setup() -> (Arc<CountingVerifier>, Router) {
        let verifier = Arc::new(CountingVerifier::default());
        let authenticator = RequestAuthenticator::new(
            verifier.clone(),
            store_with_alice(),
            ["/api/auth".to_string(), "/swagger-ui".to_string()],
        );

        let whoami = |request: Request| async move {
            request
                .extensions()
                .get::<AuthenticatedUser>()
                .map(|user| user.username.clone())
                .unwrap_or_else(|| "anonymous".to_string())
        };

        let router = Router::new()
            .route("/api/auth/login", get(whoami))
            .route("/api/cards", get(whoami))
            .layer(axum::middleware::from_fn_with_state(
                authenticator,
                authenticate,
            ));
        (verifier, router)
    }

    async fn call(router: Router, path: &str, auth: Option<&str>) -> String {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn public_path_skips_validation() {
        let (verifier, router) = setup();
        let body = call(router, "/api/auth/login", Some("Bearer good-alice")).await;

        assert_eq!(body, "anonymous");
        assert_eq!(verifier.validations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_token_attaches_principal() {
        let (verifier, router) = setup();
        let body = call(router, "/api/cards", Some("Bearer good-alice")).await;

        assert_eq!(body, "alice");
        assert_eq!(verifier.validations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_header_passes_through() {
        let (verifier, router) = setup();
        assert_eq!(call(router, "/api/cards", None).await, "anonymous");
        assert_eq!(verifier.validations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_bearer_header_passes_through() {
        let (verifier, router) = setup();
        let body = call(router, "/api/cards", Some("Basic YWxpY2U6cHc=")).await;
        assert_eq!(body, "anonymous");
        assert_eq!(verifier.validations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_token_passes_through() {
        let (verifier, router) = setup();
        let body = call(router, "/api/cards", Some("Bearer forged")).await;
        assert_eq!(body, "anonymous");
        assert_eq!(verifier.validations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_user_passes_through() {
        let (_, router) = setup();
        let body = call(router, "/api/cards", Some("Bearer good-mallory")).await;
        assert_eq!(body, "anonymous");
    }

    #[test]
    fn principal_roles_come_from_the_validated_claims() {
        let verifier = Arc::new(ExpiringVerifier::default());
        let authenticator =
            RequestAuthenticator::new(verifier.clone(), store_with_alice(), Vec::new());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer good-alice".parse().unwrap());
        let user = authenticator.resolve(&headers).unwrap();

        assert_eq!(user.username, "alice");
        assert!(user.has_authority("ROLE_USER"));
        assert_eq!(verifier.checks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prefix_matching() {
        let authenticator = RequestAuthenticator::new(
            Arc::new(CountingVerifier::default()),
            Arc::new(InMemoryStore::new()),
            ["/api/auth".to_string()],
        );
        assert!(authenticator.is_public("/api/auth"));
        assert!(authenticator.is_public("/api/auth/register"));
        assert!(!authenticator.is_public("/api/cards"));
    }
}
