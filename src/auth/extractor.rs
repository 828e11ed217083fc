// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Second of the two auth stages: authorize strictly. The middleware has
//! already attached an [`AuthenticatedUser`] to the request if the credential
//! was good; these extractors only read it and reject.
//!
//! ```rust,ignore
//! async fn my_handler(UserOnly(user): UserOnly) -> impl IntoResponse {
//!     // user is AuthenticatedUser holding ROLE_USER
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedUser, Role};

/// Extractor for any authenticated user.
///
/// Rejects with `401 unauthenticated` when the request carries no principal.
pub struct Auth(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::Unauthenticated)
    }
}

async fn require_role<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
    role: Role,
) -> Result<AuthenticatedUser, AuthError> {
    let Auth(user) = Auth::from_request_parts(parts, state).await?;

    if !user.has_authority(&role.authority()) {
        tracing::debug!(
            username = %user.username,
            required = role.as_str(),
            "Missing authority"
        );
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(user)
}

/// Extractor that requires `ROLE_USER`.
pub struct UserOnly(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for UserOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::User).await.map(UserOnly)
    }
}

/// Extractor that requires `ROLE_ADMIN`.
pub struct AdminOnly(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Admin).await.map(AdminOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(user: Option<AuthenticatedUser>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    fn user(roles: &[Role]) -> AuthenticatedUser {
        AuthenticatedUser::new(7, "alice", roles.iter().copied().collect())
    }

    #[tokio::test]
    async fn auth_requires_principal() {
        let mut parts = parts_with(None);
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn auth_reads_extensions() {
        let mut parts = parts_with(Some(user(&[Role::User])));
        let Auth(found) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.user_id, 7);
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts_with(Some(user(&[Role::User])));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_without_principal_is_unauthenticated() {
        let mut parts = parts_with(None);
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn user_only_rejects_pure_admin() {
        let mut parts = parts_with(Some(user(&[Role::Admin])));
        let result = UserOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn user_with_both_roles_passes_both() {
        let mut parts = parts_with(Some(user(&[Role::User, Role::Admin])));
        assert!(UserOnly::from_request_parts(&mut parts, &()).await.is_ok());
        assert!(AdminOnly::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn empty_role_set_is_forbidden() {
        let mut parts = parts_with(Some(user(&[])));
        assert!(matches!(
            UserOnly::from_request_parts(&mut parts, &()).await,
            Err(AuthError::InsufficientPermissions)
        ));
    }
}
